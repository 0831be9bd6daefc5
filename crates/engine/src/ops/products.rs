use sea_orm::{
    Condition, ConnectionTrait, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, UpdateMany,
    prelude::*,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use crate::{
    EngineError, NewProduct, Product, ResultEngine, plans, products,
    util::{
        contains_pattern, ensure_non_negative, ensure_non_negative_money,
        map_foreign_key_violation, normalize_required_text,
    },
};

use super::{Engine, with_tx};

const PRODUCT_IN_USE: &str = "O produto possui planos contratados e não pode ser removido.";

fn validate_new_product(cmd: &NewProduct) -> ResultEngine<()> {
    ensure_non_negative_money(cmd.min_initial_contribution, "valorMinimoAporteInicial")?;
    ensure_non_negative_money(cmd.min_extra_contribution, "valorMinimoAporteExtra")?;
    ensure_non_negative(cmd.min_entry_age, "idadeDeEntrada")?;
    ensure_non_negative(cmd.max_exit_age, "idadeDeSaida")?;
    ensure_non_negative(
        cmd.initial_withdrawal_cooldown_days,
        "carenciaInicialDeResgate",
    )?;
    ensure_non_negative(
        cmd.between_withdrawals_cooldown_days,
        "carenciaEntreResgates",
    )?;
    if cmd.min_entry_age > cmd.max_exit_age {
        return Err(EngineError::InvalidInput(
            "idadeDeEntrada não pode ser maior que idadeDeSaida".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    pub(super) async fn require_product<C: ConnectionTrait>(
        &self,
        db: &C,
        product_id: Uuid,
    ) -> ResultEngine<Product> {
        let model = products::Entity::find_by_id(product_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("Produto".to_string()))?;
        Product::try_from(model)
    }

    /// Load a product and lock its row until the transaction ends (on
    /// backends with row locks; SQLite serializes writers instead).
    pub(super) async fn require_product_for_update(
        &self,
        db: &DatabaseTransaction,
        product_id: Uuid,
    ) -> ResultEngine<Product> {
        let model = products::Entity::find_by_id(product_id.to_string())
            .lock_exclusive()
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("Produto".to_string()))?;
        Product::try_from(model)
    }

    /// Apply `update` to the product if nobody else changed it since it was
    /// read at `expected_version`. Returns the new version.
    async fn swap_product(
        &self,
        db: &DatabaseTransaction,
        product_id: Uuid,
        expected_version: i64,
        update: UpdateMany<products::Entity>,
    ) -> ResultEngine<i64> {
        let result = update
            .col_expr(products::Column::Version, Expr::value(expected_version + 1))
            .filter(products::Column::Id.eq(product_id.to_string()))
            .filter(products::Column::Version.eq(expected_version))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::Conflict("produto".to_string()));
        }
        Ok(expected_version + 1)
    }

    /// Persist the product's last withdrawal date if nobody else changed the
    /// product since it was read at `expected_version`.
    pub(super) async fn store_last_withdrawal(
        &self,
        db: &DatabaseTransaction,
        product: &mut Product,
        expected_version: i64,
    ) -> ResultEngine<()> {
        let update = products::Entity::update_many().col_expr(
            products::Column::LastWithdrawalOn,
            Expr::value(product.last_withdrawal_on),
        );
        product.version = self
            .swap_product(db, product.id, expected_version, update)
            .await?;
        Ok(())
    }

    /// Register a new product. Its last withdrawal date starts empty.
    pub async fn new_product(&self, cmd: NewProduct) -> ResultEngine<Product> {
        let name = normalize_required_text(&cmd.name, "nome", 150)?;
        let susep = normalize_required_text(&cmd.susep, "susep", 20)?;
        validate_new_product(&cmd)?;

        let product = Product::new(
            name,
            susep,
            cmd.sale_expiration,
            cmd.min_initial_contribution,
            cmd.min_extra_contribution,
            cmd.min_entry_age,
            cmd.max_exit_age,
            cmd.initial_withdrawal_cooldown_days,
            cmd.between_withdrawals_cooldown_days,
        );
        products::ActiveModel::from(&product)
            .insert(&self.database)
            .await?;

        tracing::info!(product_id = %product.id, name = %product.name, "product registered");
        Ok(product)
    }

    /// Replace the editable fields of a product.
    ///
    /// The last withdrawal date is kept. The write goes through the same
    /// versioned swap as withdrawals, so an edit never overwrites a
    /// concurrently recorded withdrawal date.
    pub async fn update_product(
        &self,
        product_id: Uuid,
        cmd: NewProduct,
    ) -> ResultEngine<Product> {
        let name = normalize_required_text(&cmd.name, "nome", 150)?;
        let susep = normalize_required_text(&cmd.susep, "susep", 20)?;
        validate_new_product(&cmd)?;

        self.retry_on_conflict("update_product", || {
            self.try_update_product(product_id, &name, &susep, &cmd)
        })
        .await
    }

    async fn try_update_product(
        &self,
        product_id: Uuid,
        name: &str,
        susep: &str,
        cmd: &NewProduct,
    ) -> ResultEngine<Product> {
        with_tx!(self, |db_tx| {
            let current = self.require_product_for_update(&db_tx, product_id).await?;

            let mut product = Product {
                name: name.to_string(),
                susep: susep.to_string(),
                sale_expiration: cmd.sale_expiration,
                min_initial_contribution: cmd.min_initial_contribution,
                min_extra_contribution: cmd.min_extra_contribution,
                min_entry_age: cmd.min_entry_age,
                max_exit_age: cmd.max_exit_age,
                initial_withdrawal_cooldown_days: cmd.initial_withdrawal_cooldown_days,
                between_withdrawals_cooldown_days: cmd.between_withdrawals_cooldown_days,
                ..current
            };

            let update = products::Entity::update_many()
                .col_expr(products::Column::Name, Expr::value(product.name.as_str()))
                .col_expr(products::Column::Susep, Expr::value(product.susep.as_str()))
                .col_expr(
                    products::Column::SaleExpiration,
                    Expr::value(product.sale_expiration),
                )
                .col_expr(
                    products::Column::MinInitialContribution,
                    Expr::value(product.min_initial_contribution.cents()),
                )
                .col_expr(
                    products::Column::MinExtraContribution,
                    Expr::value(product.min_extra_contribution.cents()),
                )
                .col_expr(products::Column::MinEntryAge, Expr::value(product.min_entry_age))
                .col_expr(products::Column::MaxExitAge, Expr::value(product.max_exit_age))
                .col_expr(
                    products::Column::InitialWithdrawalCooldownDays,
                    Expr::value(product.initial_withdrawal_cooldown_days),
                )
                .col_expr(
                    products::Column::BetweenWithdrawalsCooldownDays,
                    Expr::value(product.between_withdrawals_cooldown_days),
                );
            product.version = self
                .swap_product(&db_tx, product.id, product.version, update)
                .await?;

            tracing::info!(%product_id, name = %product.name, "product updated");
            Ok(product)
        })
    }

    /// Return a product by id.
    pub async fn product(&self, product_id: Uuid) -> ResultEngine<Product> {
        self.require_product(&self.database, product_id).await
    }

    /// List products ordered by name.
    ///
    /// `search` is a case-insensitive substring match on name or SUSEP code.
    pub async fn products(&self, search: Option<&str>) -> ResultEngine<Vec<Product>> {
        let mut query = products::Entity::find().order_by_asc(products::Column::Name);
        if let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = contains_pattern(needle);
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(products::Column::Name)))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(products::Column::Susep)))
                            .like(pattern.clone()),
                    ),
            );
        }

        query
            .all(&self.database)
            .await?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    /// Delete a product no plan references.
    pub async fn delete_product(&self, product_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_product(&db_tx, product_id).await?;

            let id = product_id.to_string();
            let plans = plans::Entity::find()
                .filter(plans::Column::ProductId.eq(id.as_str()))
                .count(&db_tx)
                .await?;
            if plans > 0 {
                return Err(EngineError::ReferenceProtected(PRODUCT_IN_USE.to_string()));
            }

            products::Entity::delete_by_id(id)
                .exec(&db_tx)
                .await
                .map_err(|err| map_foreign_key_violation(err, PRODUCT_IN_USE))?;

            tracing::info!(%product_id, "product deleted");
            Ok(())
        })
    }
}
