//! Fee structures and fee payments.
//!
//! Structures are readable by staff and, for their children's classes, by
//! parents. Payments are admin-managed; parents may read their children's
//! payments and teachers have no access.

use axum::extract::{Path, State};
use axum::Extension;

use crate::access::CurrentUser;
use crate::app::AppState;
use crate::database::models::{
    FeePayment, FeePaymentPatch, FeeStructure, FeeStructurePatch, NewFeePayment, NewFeeStructure,
};
use crate::handlers::{found, payload, JsonBody};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Role;

const PAYMENT_READERS: &[Role] = &[Role::Admin, Role::Parent];

pub async fn list_structures(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<FeeStructure>> {
    let scope = current.scope(&*state.storage).await?;
    let rows = state.storage.list_fee_structures().await?;
    Ok(ApiResponse::success(scope.classes(rows, |f| f.class_id.as_str())))
}

pub async fn get_structure(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<FeeStructure> {
    let fee = found(state.storage.get_fee_structure(&id).await?, &id)?;
    current.scope(&*state.storage).await?.require_class(&fee.class_id)?;
    Ok(ApiResponse::success(fee))
}

/// GET /api/fee-structures/class/:classId (also /api/fees/structure/:classId)
pub async fn structures_by_class(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(class_id): Path<String>,
) -> ApiResult<Vec<FeeStructure>> {
    current.scope(&*state.storage).await?.require_class(&class_id)?;
    Ok(ApiResponse::success(state.storage.list_fee_structures_by_class(&class_id).await?))
}

pub async fn create_structure(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    body: JsonBody,
) -> ApiResult<FeeStructure> {
    current.require_admin()?;
    let new: NewFeeStructure = payload(body)?;
    let fee = state.storage.create_fee_structure(new).await?;
    tracing::info!("Created {} fee of {} for class {}", fee.fee_type, fee.amount, fee.class_id);
    Ok(ApiResponse::created(fee))
}

pub async fn update_structure(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<FeeStructure> {
    current.require_admin()?;
    let patch: FeeStructurePatch = payload(body)?;
    let fee = found(state.storage.update_fee_structure(&id, patch).await?, &id)?;
    Ok(ApiResponse::success(fee))
}

pub async fn delete_structure(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    current.require_admin()?;
    state.storage.delete_fee_structure(&id).await?;
    Ok(ApiResponse::no_content())
}

pub async fn list_payments(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<FeePayment>> {
    current.require(PAYMENT_READERS)?;
    let scope = current.scope(&*state.storage).await?;
    let rows = state.storage.list_fee_payments().await?;
    Ok(ApiResponse::success(scope.students(rows, |p| p.student_id.as_str())))
}

pub async fn get_payment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<FeePayment> {
    current.require(PAYMENT_READERS)?;
    let payment = found(state.storage.get_fee_payment(&id).await?, &id)?;
    current.scope(&*state.storage).await?.require_student(&payment.student_id)?;
    Ok(ApiResponse::success(payment))
}

/// GET /api/fee-payments/student/:studentId (also /api/fees/payments/:studentId)
pub async fn payments_by_student(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(student_id): Path<String>,
) -> ApiResult<Vec<FeePayment>> {
    current.require(PAYMENT_READERS)?;
    current.scope(&*state.storage).await?.require_student(&student_id)?;
    Ok(ApiResponse::success(state.storage.list_fee_payments_by_student(&student_id).await?))
}

pub async fn create_payment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    body: JsonBody,
) -> ApiResult<FeePayment> {
    current.require_admin()?;
    let new: NewFeePayment = payload(body)?;
    let payment = state.storage.create_fee_payment(new).await?;
    tracing::info!(
        "Recorded payment {} of {} for student {}",
        payment.receipt_number,
        payment.amount,
        payment.student_id
    );
    Ok(ApiResponse::created(payment))
}

pub async fn update_payment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<FeePayment> {
    current.require_admin()?;
    let patch: FeePaymentPatch = payload(body)?;
    let payment = found(state.storage.update_fee_payment(&id, patch).await?, &id)?;
    Ok(ApiResponse::success(payment))
}

pub async fn delete_payment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    current.require_admin()?;
    state.storage.delete_fee_payment(&id).await?;
    Ok(ApiResponse::no_content())
}
