use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Client, ContractPlanCmd, Engine, EngineError, FixedClock, Money, NewClient, NewProduct, Plan,
    Product, Sex, TopUpCmd, WithdrawCmd,
};
use migration::MigratorTrait;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn engine_on(today: NaiveDate) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .clock(Arc::new(FixedClock(today)))
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn new_client(cpf: &str, email: &str, birth_date: NaiveDate) -> NewClient {
    NewClient {
        cpf: cpf.to_string(),
        name: "José Henriques".to_string(),
        email: email.to_string(),
        birth_date,
        sex: Sex::Male,
        monthly_income: Money::new(3500_00),
    }
}

fn new_product(name: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        susep: "15414.900840/2018-17".to_string(),
        sale_expiration: date(2023, 2, 15),
        min_initial_contribution: Money::new(2500_00),
        min_extra_contribution: Money::new(200_00),
        min_entry_age: 18,
        max_exit_age: 65,
        initial_withdrawal_cooldown_days: 90,
        between_withdrawals_cooldown_days: 30,
    }
}

async fn seed(engine: &Engine) -> (Client, Product, Plan) {
    let client = engine
        .new_client(new_client("12345678909", "jhrq@gmail.com", date(1991, 10, 22)))
        .await
        .unwrap();
    let product = engine.new_product(new_product("Produto 1")).await.unwrap();
    let plan = engine
        .contract_plan(ContractPlanCmd::new(
            client.id,
            product.id,
            Money::new(2500_00),
            date(2022, 9, 15),
        ))
        .await
        .unwrap();
    (client, product, plan)
}

#[tokio::test]
async fn contracted_plan_is_stored_with_initial_balance() {
    let (engine, _db) = engine_on(date(2022, 9, 15)).await;
    let (client, product, plan) = seed(&engine).await;

    let stored = engine.plan(plan.id).await.unwrap();
    assert_eq!(stored.balance, Money::new(2500_00));
    assert_eq!(stored.client_id, client.id);
    assert_eq!(stored.product_id, product.id);
    assert_eq!(stored.contracted_on, date(2022, 9, 15));
    assert_eq!(engine.plans().await.unwrap(), vec![stored]);
}

#[tokio::test]
async fn rejected_enrollment_stores_nothing() {
    let (engine, _db) = engine_on(date(2022, 9, 15)).await;
    let client = engine
        .new_client(new_client("12345678909", "jhrq@gmail.com", date(2021, 10, 22)))
        .await
        .unwrap();
    let product = engine.new_product(new_product("Produto 1")).await.unwrap();

    let err = engine
        .contract_plan(ContractPlanCmd::new(
            client.id,
            product.id,
            Money::new(2500_00),
            date(2022, 9, 15),
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidAge { min: 18, max: 65 });
    assert!(engine.plans().await.unwrap().is_empty());
}

#[tokio::test]
async fn enrollment_requires_existing_client_and_product() {
    let (engine, _db) = engine_on(date(2022, 9, 15)).await;
    let product = engine.new_product(new_product("Produto 1")).await.unwrap();

    let err = engine
        .contract_plan(ContractPlanCmd::new(
            Uuid::new_v4(),
            product.id,
            Money::new(2500_00),
            date(2022, 9, 15),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn top_up_increments_balance_and_records_it() {
    let (engine, _db) = engine_on(date(2022, 9, 15)).await;
    let (client, _product, plan) = seed(&engine).await;

    let (updated, top_up) = engine
        .top_up(TopUpCmd::new(client.id, plan.id, Money::new(200_00)))
        .await
        .unwrap();
    assert_eq!(updated.balance, Money::new(2700_00));
    assert_eq!(updated.version, plan.version + 1);

    assert_eq!(engine.plan(plan.id).await.unwrap().balance, Money::new(2700_00));
    assert_eq!(engine.top_up_record(top_up.id).await.unwrap(), top_up);
    assert_eq!(engine.top_ups().await.unwrap().len(), 1);
}

#[tokio::test]
async fn rejected_top_up_leaves_balance_unchanged() {
    let (engine, _db) = engine_on(date(2022, 9, 15)).await;
    let (client, _product, plan) = seed(&engine).await;

    let err = engine
        .top_up(TopUpCmd::new(client.id, plan.id, Money::new(199_90)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InsufficientTopUp(Money::new(200_00)));

    assert_eq!(engine.plan(plan.id).await.unwrap().balance, Money::new(2500_00));
    assert!(engine.top_ups().await.unwrap().is_empty());
}

#[tokio::test]
async fn top_up_requires_existing_client() {
    let (engine, _db) = engine_on(date(2022, 9, 15)).await;
    let (_client, _product, plan) = seed(&engine).await;

    let err = engine
        .top_up(TopUpCmd::new(Uuid::new_v4(), plan.id, Money::new(200_00)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("Cliente".to_string()));
}

#[tokio::test]
async fn concurrent_top_ups_are_not_lost() {
    let (engine, _db) = engine_on(date(2022, 9, 15)).await;
    let (client, _product, plan) = seed(&engine).await;

    let first = engine.top_up(TopUpCmd::new(client.id, plan.id, Money::new(200_00)));
    let second = engine.top_up(TopUpCmd::new(client.id, plan.id, Money::new(300_00)));
    let (first, second) = tokio::join!(first, second);
    first.unwrap();
    second.unwrap();

    let stored = engine.plan(plan.id).await.unwrap();
    assert_eq!(stored.balance, Money::new(3000_00));
    assert_eq!(stored.version, 2);
}

#[tokio::test]
async fn immediate_withdrawal_hits_initial_cooldown() {
    let (engine, _db) = engine_on(date(2022, 9, 15)).await;
    let (_client, product, plan) = seed(&engine).await;

    let err = engine
        .withdraw(WithdrawCmd::new(plan.id, Money::new(2500_00)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InitialCooldownActive(90));
    assert!(err.to_string().contains("90"));

    let product = engine.product(product.id).await.unwrap();
    assert_eq!(product.last_withdrawal_on, None);
    assert!(engine.withdrawals().await.unwrap().is_empty());
}

#[tokio::test]
async fn withdrawal_marks_product_and_blocks_other_plans() {
    let (engine, _db) = engine_on(date(2023, 1, 1)).await;
    let (client, product, plan) = seed(&engine).await;
    let other_plan = engine
        .contract_plan(ContractPlanCmd::new(
            client.id,
            product.id,
            Money::new(3000_00),
            date(2022, 9, 15),
        ))
        .await
        .unwrap();

    let (updated, withdrawal) = engine
        .withdraw(WithdrawCmd::new(plan.id, Money::new(1000_00)))
        .await
        .unwrap();
    assert_eq!(updated.last_withdrawal_on, Some(date(2023, 1, 1)));
    assert_eq!(engine.withdrawal(withdrawal.id).await.unwrap(), withdrawal);

    let stored = engine.product(product.id).await.unwrap();
    assert_eq!(stored.last_withdrawal_on, Some(date(2023, 1, 1)));
    assert_eq!(stored.version, product.version + 1);

    // The balance is not drawn down.
    assert_eq!(engine.plan(plan.id).await.unwrap().balance, Money::new(2500_00));

    let err = engine
        .withdraw(WithdrawCmd::new(other_plan.id, Money::new(100_00)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::BetweenWithdrawalsCooldownActive(30));
    assert_eq!(engine.withdrawals().await.unwrap().len(), 1);
}

#[tokio::test]
async fn insufficient_balance_keeps_last_withdrawal_date() {
    let (engine, _db) = engine_on(date(2023, 1, 1)).await;
    let (_client, product, plan) = seed(&engine).await;

    let err = engine
        .withdraw(WithdrawCmd::new(plan.id, Money::new(2500_10)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InsufficientBalance(Money::new(2500_00)));

    let stored = engine.product(product.id).await.unwrap();
    assert_eq!(stored.last_withdrawal_on, None);
    assert_eq!(stored.version, product.version);
}

#[tokio::test]
async fn withdrawal_amount_must_be_positive() {
    let (engine, _db) = engine_on(date(2023, 1, 1)).await;
    let (_client, _product, plan) = seed(&engine).await;

    for cents in [0, -100_00] {
        let err = engine
            .withdraw(WithdrawCmd::new(plan.id, Money::new(cents)))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }
}

#[tokio::test]
async fn duplicate_cpf_and_email_are_rejected() {
    let (engine, _db) = engine_on(date(2022, 9, 15)).await;
    engine
        .new_client(new_client("12345678909", "jhrq@gmail.com", date(1991, 10, 22)))
        .await
        .unwrap();

    let err = engine
        .new_client(new_client("12345678909", "other@gmail.com", date(1991, 10, 22)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ExistingKey("Já existe um cliente com este CPF.".to_string())
    );

    let err = engine
        .new_client(new_client("98765432100", "jhrq@gmail.com", date(1991, 10, 22)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("Esse e-mail já existe.".to_string()));
}

#[tokio::test]
async fn search_matches_substrings_case_insensitively() {
    let (engine, _db) = engine_on(date(2022, 9, 15)).await;
    engine
        .new_client(new_client("12345678909", "jhrq@gmail.com", date(1991, 10, 22)))
        .await
        .unwrap();
    engine.new_product(new_product("Produto 1")).await.unwrap();
    engine.new_product(new_product("Previdência Plus")).await.unwrap();

    assert_eq!(engine.clients(Some("HENRIQ")).await.unwrap().len(), 1);
    assert_eq!(engine.clients(Some("45678")).await.unwrap().len(), 1);
    assert!(engine.clients(Some("maria")).await.unwrap().is_empty());

    assert_eq!(engine.products(None).await.unwrap().len(), 2);
    assert_eq!(engine.products(Some("plus")).await.unwrap().len(), 1);
    assert_eq!(engine.products(Some("15414")).await.unwrap().len(), 2);
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
    let (engine, _db) = engine_on(date(2022, 9, 15)).await;
    engine.new_product(new_product("Produto 1")).await.unwrap();
    engine.new_product(new_product("Renda 100% CDI")).await.unwrap();
    engine
        .new_client(new_client("12345678909", "jhrq@gmail.com", date(1991, 10, 22)))
        .await
        .unwrap();

    assert!(engine.products(Some("_")).await.unwrap().is_empty());
    assert!(engine.clients(Some("%")).await.unwrap().is_empty());
    let found = engine.products(Some("0%")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Renda 100% CDI");
}

#[tokio::test]
async fn product_update_keeps_last_withdrawal_date() {
    let (engine, _db) = engine_on(date(2023, 1, 1)).await;
    let (client, product, plan) = seed(&engine).await;
    engine
        .withdraw(WithdrawCmd::new(plan.id, Money::new(100_00)))
        .await
        .unwrap();

    let mut edit = new_product("  Produto 1 Plus ");
    edit.min_extra_contribution = Money::new(500_00);
    let updated = engine.update_product(product.id, edit).await.unwrap();
    assert_eq!(updated.name, "Produto 1 Plus");
    assert_eq!(updated.min_extra_contribution, Money::new(500_00));
    assert_eq!(updated.last_withdrawal_on, Some(date(2023, 1, 1)));
    assert_eq!(updated.version, product.version + 2);
    assert_eq!(engine.product(product.id).await.unwrap(), updated);

    let err = engine
        .top_up(TopUpCmd::new(client.id, plan.id, Money::new(200_00)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InsufficientTopUp(Money::new(500_00)));
}

#[tokio::test]
async fn invalid_product_update_changes_nothing() {
    let (engine, _db) = engine_on(date(2022, 9, 15)).await;
    let product = engine.new_product(new_product("Produto 1")).await.unwrap();

    let mut inverted = new_product("Produto 1");
    inverted.min_entry_age = 70;
    let err = engine.update_product(product.id, inverted).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
    assert_eq!(engine.product(product.id).await.unwrap(), product);

    let err = engine
        .update_product(Uuid::new_v4(), new_product("Produto 2"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("Produto".to_string()));
}

#[tokio::test]
async fn concurrent_product_update_and_withdrawal_both_land() {
    let (engine, _db) = engine_on(date(2023, 1, 1)).await;
    let (_client, product, plan) = seed(&engine).await;

    let (updated, withdrawn) = tokio::join!(
        engine.update_product(product.id, new_product("Produto 1 Plus")),
        engine.withdraw(WithdrawCmd::new(plan.id, Money::new(100_00))),
    );
    updated.unwrap();
    withdrawn.unwrap();

    let stored = engine.product(product.id).await.unwrap();
    assert_eq!(stored.name, "Produto 1 Plus");
    assert_eq!(stored.last_withdrawal_on, Some(date(2023, 1, 1)));
    assert_eq!(stored.version, product.version + 2);
}

#[tokio::test]
async fn referenced_records_cannot_be_deleted() {
    let (engine, _db) = engine_on(date(2022, 9, 15)).await;
    let (client, product, plan) = seed(&engine).await;
    engine
        .top_up(TopUpCmd::new(client.id, plan.id, Money::new(200_00)))
        .await
        .unwrap();

    for err in [
        engine.delete_client(client.id).await.unwrap_err(),
        engine.delete_product(product.id).await.unwrap_err(),
        engine.delete_plan(plan.id).await.unwrap_err(),
    ] {
        assert!(matches!(err, EngineError::ReferenceProtected(_)));
    }
    assert!(engine.plan(plan.id).await.is_ok());
}

#[tokio::test]
async fn unreferenced_records_are_deleted() {
    let (engine, _db) = engine_on(date(2022, 9, 15)).await;
    let (client, product, plan) = seed(&engine).await;

    engine.delete_plan(plan.id).await.unwrap();
    engine.delete_client(client.id).await.unwrap();
    engine.delete_product(product.id).await.unwrap();

    let err = engine.client(client.id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("Cliente".to_string()));
    let err = engine.product(product.id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("Produto".to_string()));
    let err = engine.delete_plan(plan.id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("Plano".to_string()));
}
