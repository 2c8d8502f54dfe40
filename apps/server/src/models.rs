use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use carvalue_core::valuation::EstimationResult;
use carvalue_core::vehicles::{EstimateQuery, VehicleRecord};
use carvalue_core::Result as CoreResult;

/// A numeric form field sent either as a JSON number or as text.
#[derive(Deserialize, Serialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    fn as_text(&self) -> String {
        match self {
            NumericInput::Number(n) => n.to_string(),
            NumericInput::Text(s) => s.clone(),
        }
    }
}

#[derive(Deserialize, Serialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    pub make: String,
    pub model: String,
    pub mileage: NumericInput,
    pub year: NumericInput,
}

impl EstimateRequest {
    /// Validates the request; mileage and year must be non-negative numbers.
    pub fn to_query(&self) -> CoreResult<EstimateQuery> {
        EstimateQuery::parse(
            &self.make,
            &self.model,
            &self.mileage.as_text(),
            &self.year.as_text(),
        )
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparableListing {
    pub year: Option<f64>,
    pub make: String,
    pub model: String,
    pub mileage: Option<f64>,
    pub price: Option<f64>,
    pub location: String,
}

impl From<VehicleRecord> for ComparableListing {
    fn from(r: VehicleRecord) -> Self {
        Self {
            year: r.year,
            make: r.make,
            model: r.model,
            mileage: r.mileage,
            price: r.price,
            location: r.location,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    /// Unrounded estimate.
    pub estimate: f64,
    /// Estimate rounded to the nearest whole unit for display.
    pub rounded_estimate: i64,
    pub comparables: Vec<ComparableListing>,
}

impl From<EstimationResult> for EstimateResponse {
    fn from(result: EstimationResult) -> Self {
        Self {
            rounded_estimate: result.rounded_estimate(),
            estimate: result.estimate,
            comparables: result
                .comparables
                .into_iter()
                .map(ComparableListing::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_numbers_and_strings() {
        let from_numbers: EstimateRequest = serde_json::from_str(
            r#"{"make":"Honda","model":"Civic","mileage":28000,"year":2019}"#,
        )
        .unwrap();
        let from_strings: EstimateRequest = serde_json::from_str(
            r#"{"make":"Honda","model":"Civic","mileage":"28000","year":"2019"}"#,
        )
        .unwrap();

        assert_eq!(
            from_numbers.to_query().unwrap(),
            from_strings.to_query().unwrap()
        );
    }

    #[test]
    fn test_request_rejects_negative_or_text_values() {
        let negative: EstimateRequest = serde_json::from_str(
            r#"{"make":"Honda","model":"Civic","mileage":-1,"year":2019}"#,
        )
        .unwrap();
        assert!(negative.to_query().is_err());

        let words: EstimateRequest = serde_json::from_str(
            r#"{"make":"Honda","model":"Civic","mileage":"lots","year":"2019"}"#,
        )
        .unwrap();
        assert!(words.to_query().is_err());
    }

    #[test]
    fn test_response_rounds_estimate() {
        let response = EstimateResponse::from(EstimationResult {
            estimate: 19876.5,
            comparables: vec![VehicleRecord::new(
                Some(2018.0),
                "Honda",
                "Civic",
                None,
                Some(19000.0),
                "Reno, NV",
            )],
        });

        // Halves round to the even neighbour.
        assert_eq!(response.rounded_estimate, 19876);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["estimate"], 19876.5);
        assert_eq!(json["roundedEstimate"], 19876);
        assert_eq!(json["comparables"][0]["mileage"], serde_json::Value::Null);
    }
}
