use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Search filter plus the fee assumptions used for ROI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchCriteria {
    pub make: String,
    pub model: String,
    pub max_price: u64,
    pub min_year: i32,
    pub max_mileage: u64,
    pub import_fee: u64,
    pub sale_fee: u64,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            make: "BMW".to_string(),
            model: "530d".to_string(),
            max_price: 25_000,
            min_year: 2017,
            max_mileage: 120_000,
            import_fee: 1_500,
            sale_fee: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CriteriaField {
    Make,
    Model,
    MaxPrice,
    MinYear,
    MaxMileage,
    ImportFee,
    SaleFee,
}

impl CriteriaField {
    pub const ALL: [CriteriaField; 7] = [
        CriteriaField::Make,
        CriteriaField::Model,
        CriteriaField::MaxPrice,
        CriteriaField::MinYear,
        CriteriaField::MaxMileage,
        CriteriaField::ImportFee,
        CriteriaField::SaleFee,
    ];

    /// Canonical identifier, also used in callback data.
    pub fn key(self) -> &'static str {
        match self {
            CriteriaField::Make => "make",
            CriteriaField::Model => "model",
            CriteriaField::MaxPrice => "maxPrice",
            CriteriaField::MinYear => "minYear",
            CriteriaField::MaxMileage => "maxMileage",
            CriteriaField::ImportFee => "importFee",
            CriteriaField::SaleFee => "saleFee",
        }
    }

    /// Human label shown in menus and confirmations.
    pub fn label(self) -> &'static str {
        match self {
            CriteriaField::Make => "Make",
            CriteriaField::Model => "Model",
            CriteriaField::MaxPrice => "Max price (€)",
            CriteriaField::MinYear => "Min year",
            CriteriaField::MaxMileage => "Max mileage",
            CriteriaField::ImportFee => "Import fee (€)",
            CriteriaField::SaleFee => "Sale fee (€)",
        }
    }
}

impl fmt::Display for CriteriaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CriteriaField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "make" => Ok(CriteriaField::Make),
            "model" => Ok(CriteriaField::Model),
            "maxPrice" | "max_price" => Ok(CriteriaField::MaxPrice),
            "minYear" | "min_year" => Ok(CriteriaField::MinYear),
            "maxMileage" | "max_mileage" => Ok(CriteriaField::MaxMileage),
            "importFee" | "import_fee" => Ok(CriteriaField::ImportFee),
            "saleFee" | "sale_fee" => Ok(CriteriaField::SaleFee),
            other => Err(ValidationError::UnknownField(other.to_string())),
        }
    }
}

/// Value a field holds after a successful edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriteriaValue {
    Text(String),
    Unsigned(u64),
    Year(i32),
}

impl fmt::Display for CriteriaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriteriaValue::Text(s) => f.write_str(s),
            CriteriaValue::Unsigned(n) => write!(f, "{}", n),
            CriteriaValue::Year(y) => write!(f, "{}", y),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown criteria field: {0:?}")]
    UnknownField(String),
    #[error("{field} expects a whole number, got {raw:?}")]
    NotANumber { field: CriteriaField, raw: String },
    #[error("{field} cannot be empty")]
    Empty { field: CriteriaField },
}

impl SearchCriteria {
    pub fn get(&self, field: CriteriaField) -> CriteriaValue {
        match field {
            CriteriaField::Make => CriteriaValue::Text(self.make.clone()),
            CriteriaField::Model => CriteriaValue::Text(self.model.clone()),
            CriteriaField::MaxPrice => CriteriaValue::Unsigned(self.max_price),
            CriteriaField::MinYear => CriteriaValue::Year(self.min_year),
            CriteriaField::MaxMileage => CriteriaValue::Unsigned(self.max_mileage),
            CriteriaField::ImportFee => CriteriaValue::Unsigned(self.import_fee),
            CriteriaField::SaleFee => CriteriaValue::Unsigned(self.sale_fee),
        }
    }

    /// Parse `raw` for `field` and store it. On error nothing is modified.
    pub fn set_field(
        &mut self,
        field: CriteriaField,
        raw: &str,
    ) -> Result<CriteriaValue, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field });
        }
        let not_a_number = || ValidationError::NotANumber {
            field,
            raw: raw.to_string(),
        };

        match field {
            CriteriaField::Make => self.make = raw.to_string(),
            CriteriaField::Model => self.model = raw.to_string(),
            CriteriaField::MinYear => {
                self.min_year = raw.parse().map_err(|_| not_a_number())?;
            }
            CriteriaField::MaxPrice
            | CriteriaField::MaxMileage
            | CriteriaField::ImportFee
            | CriteriaField::SaleFee => {
                let n: u64 = raw.parse().map_err(|_| not_a_number())?;
                match field {
                    CriteriaField::MaxPrice => self.max_price = n,
                    CriteriaField::MaxMileage => self.max_mileage = n,
                    CriteriaField::ImportFee => self.import_fee = n,
                    _ => self.sale_fee = n,
                }
            }
        }
        Ok(self.get(field))
    }

    /// Same as [`set_field`](Self::set_field) but takes the field by identifier.
    pub fn set_field_by_name(
        &mut self,
        name: &str,
        raw: &str,
    ) -> Result<CriteriaValue, ValidationError> {
        let field: CriteriaField = name.parse()?;
        self.set_field(field, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_numeric_max_price_leaves_value() {
        let mut c = SearchCriteria::default();
        let before = c.max_price;
        let err = c.set_field_by_name("maxPrice", "abc").unwrap_err();
        assert!(matches!(err, ValidationError::NotANumber { field: CriteriaField::MaxPrice, .. }));
        assert_eq!(c.max_price, before);
    }

    #[test]
    fn test_negative_unsigned_rejected() {
        let mut c = SearchCriteria::default();
        assert!(c.set_field(CriteriaField::SaleFee, "-5").is_err());
        assert_eq!(c.sale_fee, 500);
    }

    #[test]
    fn test_min_year_accepts_signed() {
        let mut c = SearchCriteria::default();
        assert_eq!(c.set_field(CriteriaField::MinYear, " 2019 ").unwrap(), CriteriaValue::Year(2019));
        assert_eq!(c.min_year, 2019);
    }

    #[test]
    fn test_text_field_trimmed() {
        let mut c = SearchCriteria::default();
        let v = c.set_field(CriteriaField::Make, "  Audi ").unwrap();
        assert_eq!(v.to_string(), "Audi");
        assert_eq!(c.make, "Audi");
    }

    #[test]
    fn test_empty_text_rejected() {
        let mut c = SearchCriteria::default();
        assert_eq!(
            c.set_field(CriteriaField::Model, "   "),
            Err(ValidationError::Empty { field: CriteriaField::Model })
        );
        assert_eq!(c.model, "530d");
    }

    #[test]
    fn test_unknown_field() {
        let mut c = SearchCriteria::default();
        assert!(matches!(
            c.set_field_by_name("colour", "red"),
            Err(ValidationError::UnknownField(_))
        ));
        assert_eq!(c, SearchCriteria::default());
    }

    #[test]
    fn test_field_keys_round_trip() {
        for field in CriteriaField::ALL {
            assert_eq!(field.key().parse::<CriteriaField>().unwrap(), field);
        }
        assert_eq!("max_mileage".parse::<CriteriaField>().unwrap(), CriteriaField::MaxMileage);
    }
}
