//! The module contains `Client` struct and its implementation.

use chrono::NaiveDate;
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

/// Mean length of a year in days, used to turn elapsed days into an age.
const DAYS_PER_YEAR: f64 = 365.242189;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }
}

impl TryFrom<&str> for Sex {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "M" => Ok(Self::Male),
            "F" => Ok(Self::Female),
            other => Err(EngineError::InvalidInput(format!("sexo inválido: {other}"))),
        }
    }
}

/// A client that can contract plans.
///
/// Clients are pure data: the engine never mutates them after registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Client {
    pub id: Uuid,
    /// Brazilian tax id, 11 digits, unique.
    pub cpf: String,
    pub name: String,
    /// Unique.
    pub email: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
    pub monthly_income: Money,
}

impl Client {
    pub fn new(
        cpf: String,
        name: String,
        email: String,
        birth_date: NaiveDate,
        sex: Sex,
        monthly_income: Money,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            cpf,
            name,
            email,
            birth_date,
            sex,
            monthly_income,
        }
    }

    /// Age of the client on `on`, see [`age_on`].
    pub fn age(&self, on: NaiveDate) -> i32 {
        age_on(self.birth_date, on)
    }
}

/// Age in whole years between `birth_date` and `on`.
///
/// Elapsed days are divided by [`DAYS_PER_YEAR`], rounded to one decimal and
/// then truncated. The rounding step means that a client a few days short of
/// a birthday already counts as the older age.
pub fn age_on(birth_date: NaiveDate, on: NaiveDate) -> i32 {
    let days = (on - birth_date).num_days() as f64;
    let years = (days / DAYS_PER_YEAR * 10.0).round() / 10.0;
    years.trunc() as i32
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub cpf: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub birth_date: Date,
    pub sex: String,
    pub monthly_income: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::plans::Entity")]
    Plans,
    #[sea_orm(has_many = "super::top_ups::Entity")]
    TopUps,
}

impl Related<super::plans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plans.def()
    }
}

impl Related<super::top_ups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TopUps.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Client> for ActiveModel {
    fn from(value: &Client) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            cpf: ActiveValue::Set(value.cpf.clone()),
            name: ActiveValue::Set(value.name.clone()),
            email: ActiveValue::Set(value.email.clone()),
            birth_date: ActiveValue::Set(value.birth_date),
            sex: ActiveValue::Set(value.sex.as_str().to_string()),
            monthly_income: ActiveValue::Set(value.monthly_income.cents()),
        }
    }
}

impl TryFrom<Model> for Client {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "cliente")?,
            sex: Sex::try_from(model.sex.as_str())?,
            cpf: model.cpf,
            name: model.name,
            email: model.email,
            birth_date: model.birth_date,
            monthly_income: Money::new(model.monthly_income),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_on_birthday() {
        assert_eq!(age_on(date(1991, 10, 22), date(2022, 10, 22)), 31);
    }

    #[test]
    fn age_rounds_to_one_decimal_before_truncating() {
        // 30.96 years rounds to 31.0.
        assert_eq!(age_on(date(1991, 10, 22), date(2022, 10, 8)), 31);
        // 30.9 years stays 30.
        assert_eq!(age_on(date(1991, 10, 22), date(2022, 9, 15)), 30);
    }

    #[test]
    fn newborn_is_zero() {
        assert_eq!(age_on(date(2021, 10, 22), date(2021, 10, 22)), 0);
    }

    #[test]
    fn sex_roundtrip_and_rejects_unknown() {
        assert_eq!(Sex::try_from("M").unwrap(), Sex::Male);
        assert_eq!(Sex::Female.as_str(), "F");
        assert!(Sex::try_from("X").is_err());
    }
}
