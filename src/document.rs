//! Wire model for goods-introduction documents.
//!
//! Field names follow the registration API's JSON contract, which mixes
//! snake_case and camelCase on the same object. The renames below reproduce
//! that contract verbatim, including the `productioDate` spelling the API
//! uses on the document itself (the product entry spells it `production_date`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Document kinds accepted by the creation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocType {
    /// Introduction of domestically produced goods into circulation.
    LpIntroduceGoods,
}

/// Document lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocStatus {
    New,
}

/// Production type marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    ProductType,
}

/// Participant block of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    #[serde(rename = "participantInn")]
    pub participant_inn: String,
}

/// One product entry inside a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub certificate_document: String,
    pub certificate_document_date: NaiveDate,
    pub certificate_document_number: String,
    pub owner_inn: String,
    pub producer_inn: String,
    pub production_date: NaiveDate,
    pub tnved_code: String,
    pub uit_code: String,
    pub uitu_code: String,
}

/// A goods-introduction document as the creation endpoint expects it.
///
/// Dates serialize as ISO `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub description: Description,
    pub doc_id: String,
    pub doc_status: DocStatus,
    pub doc_type: DocType,
    #[serde(rename = "importRequest")]
    pub import_request: bool,
    #[serde(rename = "ownerInn")]
    pub owner_inn: String,
    pub participant_inn: String,
    #[serde(rename = "producerInn")]
    pub producer_inn: String,
    #[serde(rename = "productioDate")]
    pub production_date: NaiveDate,
    pub production_type: ProductType,
    pub products: Vec<Product>,
    pub reg_date: NaiveDate,
    pub reg_number: String,
}
