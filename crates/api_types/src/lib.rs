use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use uuid::Uuid;

/// A decimal amount with two fractional digits, held in minor units.
///
/// Serialized as a JSON string (`"2500.00"`). Accepts a string or a JSON
/// number on input; `,` is accepted as the decimal separator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("valor vazio")]
    Empty,
    #[error("valor inválido: {0}")]
    Malformed(String),
    #[error("no máximo 2 casas decimais: {0}")]
    TooPrecise(String),
    #[error("valor fora do limite: {0}")]
    OutOfRange(String),
}

impl Amount {
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (int_part, frac_part) = match digits.split_once(['.', ',']) {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (digits, ""),
        };

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(AmountError::Malformed(trimmed.to_string()));
        }
        if frac_part.len() > 2 {
            return Err(AmountError::TooPrecise(trimmed.to_string()));
        }

        let out_of_range = || AmountError::OutOfRange(trimmed.to_string());
        let units = if int_part.is_empty() {
            0
        } else {
            int_part.parse::<i64>().map_err(|_| out_of_range())?
        };
        let cents = match frac_part.len() {
            0 => 0,
            1 => frac_part.parse::<i64>().map_err(|_| out_of_range())? * 10,
            _ => frac_part.parse::<i64>().map_err(|_| out_of_range())?,
        };
        let minor = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(out_of_range)?;

        Ok(Self(if negative { -minor } else { minor }))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl de::Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal amount with at most 2 fractional digits")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
                v.checked_mul(100)
                    .map(Amount)
                    .ok_or_else(|| E::custom(AmountError::OutOfRange(v.to_string())))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                i64::try_from(v)
                    .ok()
                    .and_then(|v| v.checked_mul(100))
                    .map(Amount)
                    .ok_or_else(|| E::custom(AmountError::OutOfRange(v.to_string())))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
                if !v.is_finite() {
                    return Err(E::custom(AmountError::Malformed(v.to_string())));
                }
                // Shortest round-trip form, so 2500.1 stays "2500.1".
                v.to_string().parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sexo {
    M,
    F,
}

pub mod busca {
    use super::*;

    /// `?search=` on list endpoints.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct Busca {
        pub search: Option<String>,
    }
}

pub mod cliente {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ClienteNew {
        /// Only the 11 digits.
        pub cpf: String,
        pub nome: String,
        pub email: String,
        pub data_de_nascimento: NaiveDate,
        pub sexo: Sexo,
        pub renda_mensal: Amount,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Cliente {
        pub id: Uuid,
        pub cpf: String,
        pub nome: String,
        pub email: String,
        pub data_de_nascimento: NaiveDate,
        pub sexo: Sexo,
        pub renda_mensal: Amount,
    }
}

pub mod produto {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProdutoNew {
        pub nome: String,
        /// SUSEP registration code.
        pub susep: String,
        pub expiracao_de_venda: NaiveDate,
        pub valor_minimo_aporte_inicial: Amount,
        pub valor_minimo_aporte_extra: Amount,
        pub idade_de_entrada: i32,
        pub idade_de_saida: i32,
        pub carencia_inicial_de_resgate: i32,
        pub carencia_entre_resgates: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Produto {
        pub id: Uuid,
        pub nome: String,
        pub susep: String,
        pub expiracao_de_venda: NaiveDate,
        pub valor_minimo_aporte_inicial: Amount,
        pub valor_minimo_aporte_extra: Amount,
        pub idade_de_entrada: i32,
        pub idade_de_saida: i32,
        pub carencia_inicial_de_resgate: i32,
        pub carencia_entre_resgates: i32,
        /// Last withdrawal on any plan of the product.
        pub data_ultimo_resgate: Option<NaiveDate>,
    }
}

pub mod contratacao {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ContratacaoNew {
        pub id_cliente: Uuid,
        pub id_produto: Uuid,
        /// Initial contribution.
        pub aporte: Amount,
        pub data_da_contratacao: NaiveDate,
    }

    /// A contracted plan. `aporte` is the current balance.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Contratacao {
        pub id: Uuid,
        pub id_cliente: Uuid,
        pub id_produto: Uuid,
        pub aporte: Amount,
        pub data_da_contratacao: NaiveDate,
    }
}

pub mod aporte_extra {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AporteExtraNew {
        pub id_cliente: Uuid,
        pub id_plano: Uuid,
        pub valor_aporte: Amount,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AporteExtra {
        pub id: Uuid,
        pub id_cliente: Uuid,
        pub id_plano: Uuid,
        pub valor_aporte: Amount,
    }
}

pub mod resgate {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResgateNew {
        pub id_plano: Uuid,
        pub valor_resgate: Amount,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Resgate {
        pub id: Uuid,
        pub id_plano: Uuid,
        pub valor_resgate: Amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_parses_decimal_strings() {
        assert_eq!("2500".parse::<Amount>().unwrap().minor(), 250_000);
        assert_eq!("2500.5".parse::<Amount>().unwrap().minor(), 250_050);
        assert_eq!("2500,05".parse::<Amount>().unwrap().minor(), 250_005);
        assert_eq!(".5".parse::<Amount>().unwrap().minor(), 50);
        assert_eq!("-1.00".parse::<Amount>().unwrap().minor(), -100);
    }

    #[test]
    fn amount_rejects_garbage_and_extra_precision() {
        assert_eq!("".parse::<Amount>(), Err(AmountError::Empty));
        assert!(matches!("1.005".parse::<Amount>(), Err(AmountError::TooPrecise(_))));
        assert!(matches!("abc".parse::<Amount>(), Err(AmountError::Malformed(_))));
        assert!(matches!("1.2.3".parse::<Amount>(), Err(AmountError::Malformed(_))));
        assert!(matches!(".".parse::<Amount>(), Err(AmountError::Malformed(_))));
    }

    #[test]
    fn amount_displays_two_fractional_digits() {
        assert_eq!(Amount::from_minor(250_000).to_string(), "2500.00");
        assert_eq!(Amount::from_minor(5).to_string(), "0.05");
        assert_eq!(Amount::from_minor(-150).to_string(), "-1.50");
    }

    #[test]
    fn amount_json_accepts_strings_and_numbers() {
        let parsed: Vec<Amount> = serde_json::from_str(r#"["2500.00", 2500, 2500.1]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                Amount::from_minor(250_000),
                Amount::from_minor(250_000),
                Amount::from_minor(250_010),
            ]
        );
        assert!(serde_json::from_str::<Amount>("2500.001").is_err());
        assert_eq!(
            serde_json::to_string(&Amount::from_minor(250_000)).unwrap(),
            r#""2500.00""#
        );
    }
}
