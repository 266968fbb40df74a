//! Cost reference tables used by the budgeting tools.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{
    AccommodationService, ParticipantCostType, PrintingDocumentType, ProcurementCategory,
    ProcurementUnit, SessionCostType, SupervisorCostType, TripType,
};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub region: Option<String>,
    pub is_hardship_area: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LandTransport {
    pub id: String,
    pub origin_id: String,
    pub destination_id: String,
    pub trip_type: TripType,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AirTransport {
    pub id: String,
    pub origin_id: String,
    pub destination_id: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PerDiem {
    pub id: String,
    pub location_id: String,
    pub amount: f64,
    pub hardship_allowance_amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Accommodation {
    pub id: String,
    pub location_id: String,
    pub service_type: AccommodationService,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ParticipantCost {
    pub id: String,
    pub cost_type: ParticipantCostType,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SessionCost {
    pub id: String,
    pub cost_type: SessionCostType,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PrintingCost {
    pub id: String,
    pub document_type: PrintingDocumentType,
    pub price_per_page: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SupervisorCost {
    pub id: String,
    pub cost_type: SupervisorCostType,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ProcurementItem {
    pub id: String,
    pub category: ProcurementCategory,
    pub name: String,
    pub unit: ProcurementUnit,
    pub unit_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
