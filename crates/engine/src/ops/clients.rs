use sea_orm::{
    Condition, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use crate::{
    Client, EngineError, NewClient, ResultEngine, clients, plans, top_ups,
    util::{
        contains_pattern, is_valid_email, map_foreign_key_violation, map_unique_violation,
        normalize_required_text,
    },
};

use super::{Engine, with_tx};

const DUPLICATE_CPF: &str = "Já existe um cliente com este CPF.";
const DUPLICATE_EMAIL: &str = "Esse e-mail já existe.";
const DUPLICATE_CLIENT: &str = "Já existe um cliente com este CPF ou e-mail.";
const CLIENT_IN_USE: &str = "O cliente possui planos ou aportes e não pode ser removido.";

fn normalize_cpf(value: &str) -> ResultEngine<String> {
    let cpf = value.trim();
    if cpf.len() != 11 || !cpf.chars().all(|c| c.is_ascii_digit()) {
        return Err(EngineError::InvalidInput(
            "o CPF deve conter apenas os 11 números".to_string(),
        ));
    }
    Ok(cpf.to_string())
}

impl Engine {
    pub(super) async fn require_client<C: ConnectionTrait>(
        &self,
        db: &C,
        client_id: Uuid,
    ) -> ResultEngine<Client> {
        let model = clients::Entity::find_by_id(client_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("Cliente".to_string()))?;
        Client::try_from(model)
    }

    /// Register a new client.
    ///
    /// CPF and e-mail are unique: the duplicate is reported before inserting,
    /// and the storage unique indexes catch a concurrent registration.
    pub async fn new_client(&self, cmd: NewClient) -> ResultEngine<Client> {
        let cpf = normalize_cpf(&cmd.cpf)?;
        let name = normalize_required_text(&cmd.name, "nome", 100)?;
        let email = cmd.email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(EngineError::InvalidInput(
                "informe um endereço de e-mail válido".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let cpf_taken = clients::Entity::find()
                .filter(clients::Column::Cpf.eq(cpf.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if cpf_taken {
                return Err(EngineError::ExistingKey(DUPLICATE_CPF.to_string()));
            }

            let email_taken = clients::Entity::find()
                .filter(clients::Column::Email.eq(email.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if email_taken {
                return Err(EngineError::ExistingKey(DUPLICATE_EMAIL.to_string()));
            }

            let client = Client::new(
                cpf,
                name,
                email,
                cmd.birth_date,
                cmd.sex,
                cmd.monthly_income,
            );
            clients::ActiveModel::from(&client)
                .insert(&db_tx)
                .await
                .map_err(|err| map_unique_violation(err, DUPLICATE_CLIENT))?;

            tracing::info!(client_id = %client.id, "client registered");
            Ok(client)
        })
    }

    /// Return a client by id.
    pub async fn client(&self, client_id: Uuid) -> ResultEngine<Client> {
        self.require_client(&self.database, client_id).await
    }

    /// List clients ordered by name.
    ///
    /// `search` is a case-insensitive substring match on CPF, name or e-mail.
    pub async fn clients(&self, search: Option<&str>) -> ResultEngine<Vec<Client>> {
        let mut query = clients::Entity::find().order_by_asc(clients::Column::Name);
        if let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = contains_pattern(needle);
            query = query.filter(
                Condition::any()
                    .add(Expr::col(clients::Column::Cpf).like(pattern.clone()))
                    .add(
                        Expr::expr(Func::lower(Expr::col(clients::Column::Name)))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(clients::Column::Email)))
                            .like(pattern.clone()),
                    ),
            );
        }

        query
            .all(&self.database)
            .await?
            .into_iter()
            .map(Client::try_from)
            .collect()
    }

    /// Delete a client that no plan or top-up references.
    pub async fn delete_client(&self, client_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_client(&db_tx, client_id).await?;

            let id = client_id.to_string();
            let plans = plans::Entity::find()
                .filter(plans::Column::ClientId.eq(id.as_str()))
                .count(&db_tx)
                .await?;
            let top_ups = top_ups::Entity::find()
                .filter(top_ups::Column::ClientId.eq(id.as_str()))
                .count(&db_tx)
                .await?;
            if plans > 0 || top_ups > 0 {
                return Err(EngineError::ReferenceProtected(CLIENT_IN_USE.to_string()));
            }

            clients::Entity::delete_by_id(id)
                .exec(&db_tx)
                .await
                .map_err(|err| map_foreign_key_violation(err, CLIENT_IN_USE))?;

            tracing::info!(%client_id, "client deleted");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpf_must_be_eleven_digits() {
        assert_eq!(normalize_cpf(" 12345678909 ").unwrap(), "12345678909");
        assert!(normalize_cpf("123.456.789-09").is_err());
        assert!(normalize_cpf("1234567890").is_err());
        assert!(normalize_cpf("1234567890a").is_err());
    }
}
