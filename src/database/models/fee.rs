use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::impl_entity;
use crate::types::{FeeFrequency, PaymentMethod, PaymentStatus};
use crate::validation::{Field, Kind, Mode, Schema};

/// A fee a class is charged, e.g. monthly tuition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FeeStructure {
    pub id: String,
    pub class_id: String,
    pub fee_type: String,
    pub amount: Decimal,
    pub frequency: FeeFrequency,
    pub academic_year: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(FeeStructure, "fee_structure", "Fee structure");

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeeStructure {
    pub class_id: String,
    pub fee_type: String,
    pub amount: Decimal,
    pub frequency: FeeFrequency,
    pub academic_year: String,
}

const FEE_STRUCTURE_FIELDS: &[Field] = &[
    Field::required("classId", Kind::Text),
    Field::required("feeType", Kind::Text),
    Field::required("amount", Kind::Money),
    Field::required("frequency", Kind::OneOf(FeeFrequency::VALUES)),
    Field::required("academicYear", Kind::Text),
];

impl Schema for NewFeeStructure {
    const FIELDS: &'static [Field] = FEE_STRUCTURE_FIELDS;
    const MODE: Mode = Mode::Insert;
}

impl NewFeeStructure {
    pub fn into_row(self, id: String, now: DateTime<Utc>) -> FeeStructure {
        FeeStructure {
            id,
            class_id: self.class_id,
            fee_type: self.fee_type,
            amount: self.amount,
            frequency: self.frequency,
            academic_year: self.academic_year,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeeStructurePatch {
    pub class_id: Option<String>,
    pub fee_type: Option<String>,
    pub amount: Option<Decimal>,
    pub frequency: Option<FeeFrequency>,
    pub academic_year: Option<String>,
}

impl Schema for FeeStructurePatch {
    const FIELDS: &'static [Field] = FEE_STRUCTURE_FIELDS;
    const MODE: Mode = Mode::Patch;
}

impl FeeStructurePatch {
    pub fn apply(self, row: &mut FeeStructure, now: DateTime<Utc>) {
        if let Some(v) = self.class_id {
            row.class_id = v;
        }
        if let Some(v) = self.fee_type {
            row.fee_type = v;
        }
        if let Some(v) = self.amount {
            row.amount = v;
        }
        if let Some(v) = self.frequency {
            row.frequency = v;
        }
        if let Some(v) = self.academic_year {
            row.academic_year = v;
        }
        row.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FeePayment {
    pub id: String,
    pub student_id: String,
    pub fee_structure_id: String,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub receipt_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(FeePayment, "fee_payments", "Fee payment");

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeePayment {
    pub student_id: String,
    pub fee_structure_id: String,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: PaymentStatus,
    pub receipt_number: String,
}

const FEE_PAYMENT_FIELDS: &[Field] = &[
    Field::required("studentId", Kind::Text),
    Field::required("feeStructureId", Kind::Text),
    Field::required("amount", Kind::Money),
    Field::required("paymentDate", Kind::Date),
    Field::required("paymentMethod", Kind::OneOf(PaymentMethod::VALUES)),
    Field::defaulted("status", Kind::OneOf(PaymentStatus::VALUES)),
    Field::required("receiptNumber", Kind::Text),
];

impl Schema for NewFeePayment {
    const FIELDS: &'static [Field] = FEE_PAYMENT_FIELDS;
    const MODE: Mode = Mode::Insert;
}

impl NewFeePayment {
    pub fn into_row(self, id: String, now: DateTime<Utc>) -> FeePayment {
        FeePayment {
            id,
            student_id: self.student_id,
            fee_structure_id: self.fee_structure_id,
            amount: self.amount,
            payment_date: self.payment_date,
            payment_method: self.payment_method,
            status: self.status,
            receipt_number: self.receipt_number,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeePaymentPatch {
    pub student_id: Option<String>,
    pub fee_structure_id: Option<String>,
    pub amount: Option<Decimal>,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub status: Option<PaymentStatus>,
    pub receipt_number: Option<String>,
}

impl Schema for FeePaymentPatch {
    const FIELDS: &'static [Field] = FEE_PAYMENT_FIELDS;
    const MODE: Mode = Mode::Patch;
}

impl FeePaymentPatch {
    pub fn apply(self, row: &mut FeePayment, now: DateTime<Utc>) {
        if let Some(v) = self.student_id {
            row.student_id = v;
        }
        if let Some(v) = self.fee_structure_id {
            row.fee_structure_id = v;
        }
        if let Some(v) = self.amount {
            row.amount = v;
        }
        if let Some(v) = self.payment_date {
            row.payment_date = v;
        }
        if let Some(v) = self.payment_method {
            row.payment_method = v;
        }
        if let Some(v) = self.status {
            row.status = v;
        }
        if let Some(v) = self.receipt_number {
            row.receipt_number = v;
        }
        row.updated_at = now;
    }
}
