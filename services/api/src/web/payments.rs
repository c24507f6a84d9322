//! services/api/src/web/payments.rs
//!
//! Fee records: the admin overview grouped by status, a parent's view of
//! their child's balance, the simulated payment, and the fee notice letter.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use campify_core::derive::{payment_summary, PaymentIntegrity};
use campify_core::domain::{Payment, PaymentStatus, User};
use campify_core::policy::{can_pay_for, payment_access, PaymentAccess, Route};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorBody};
use crate::web::middleware::{require_route, subject_student, CurrentUser};
use crate::web::overview::ChildQuery;
use crate::web::state::AppState;
use crate::web::views::{name_of, PaymentView, UserView};

const PAYMENTS_PAGE: &str = "/dashboard/payments";

//=========================================================================================
// API Response Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminPayments {
    pub paid: Vec<PaymentView>,
    pub pending: Vec<PaymentView>,
    pub overdue: Vec<PaymentView>,
    pub total_collected: f64,
    pub total_outstanding: f64,
}

#[derive(Serialize, ToSchema)]
pub struct ParentPayments {
    pub child: Option<UserView>,
    /// `None` when no child is linked or no fee record exists.
    pub payment: Option<PaymentView>,
}

/// Exactly one of `admin` and `parent` is present.
#[derive(Serialize, ToSchema)]
pub struct PaymentsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminPayments>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentPayments>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub payment_id: String,
    pub amount: f64,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeeNotice {
    pub file_name: String,
    pub content: String,
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Formats an amount as US dollars, e.g. `$5,500.00`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

fn payment_view(payment: &Payment, users: &[User]) -> PaymentView {
    let summary = payment_summary(payment);
    if summary.integrity != PaymentIntegrity::Consistent {
        warn!(
            "Payment {} is marked {} with a balance of {}",
            payment.id,
            payment.status.as_str(),
            summary.balance
        );
    }
    PaymentView::new(payment, &summary, users)
}

fn fee_notice(payment: &Payment, student_name: &str, today: NaiveDate) -> FeeNotice {
    let status = payment.status.as_str();
    let balance = format_currency(payment.amount_due - payment.amount_paid);
    let rule = "===================================================";
    let date = |d: NaiveDate| d.format("%m/%d/%Y").to_string();

    let mut content = format!("Fee {status} Report - {}\n{rule}\n\n", date(today));
    content.push_str(&format!("Student: {student_name}\n"));
    content.push_str(&format!("Student ID: {}\n", payment.student_id));
    content.push_str(&format!("Amount Due: {}\n", format_currency(payment.amount_due)));
    content.push_str(&format!("Amount Paid: {}\n", format_currency(payment.amount_paid)));
    content.push_str(&format!("Balance: {balance}\n"));
    content.push_str(&format!("Status: {status}\n"));
    content.push_str(&format!("Due Date: {}\n", date(payment.due_date)));
    content.push_str("---------------------------------------------------\n\n");
    content.push_str(&format!("Dear Parent/Guardian of {student_name},\n\n"));
    if payment.status == PaymentStatus::Overdue {
        content.push_str(&format!(
            "This is a formal notice regarding an overdue fee balance for the current semester. \
             Our records indicate that there is a remaining balance of {balance} which is past the due date.\n\n"
        ));
    } else {
        content.push_str(&format!(
            "This is a friendly reminder regarding the outstanding fee balance for the current semester. \
             Our records indicate that there is a remaining balance of {balance}.\n\n"
        ));
    }
    content.push_str(
        "Please log in to the parent portal to settle the outstanding amount at your earliest convenience. \
         If you believe this is an error or wish to discuss a payment plan, please contact the administration office.\n\n",
    );
    content.push_str("Thank you for your prompt attention to this matter.\n\n");
    content.push_str(&format!("Sincerely,\nCampify Administration\n\n{rule}\n\n"));

    FeeNotice {
        file_name: format!(
            "fee_{}_{}_report.txt",
            student_name.replace(' ', "_"),
            status.to_lowercase()
        ),
        content,
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Admin: every fee record grouped by status. Parent: the child's balance.
#[utoipa::path(
    get,
    path = "/payments",
    params(ChildQuery),
    responses(
        (status = 200, description = "Fee records visible to the user", body = PaymentsResponse),
        (status = 403, description = "Role cannot view fees", body = ErrorBody)
    ),
    tag = "payments"
)]
pub async fn list_payments_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<ChildQuery>,
) -> Result<Json<PaymentsResponse>, ApiError> {
    require_route(&user, Route::Payments)?;
    let users = state.store.list_users().await?;
    let payments = state.store.list_payments().await?;

    match payment_access(&user) {
        PaymentAccess::All => {
            let views: Vec<PaymentView> = payments.iter().map(|p| payment_view(p, &users)).collect();
            let by_status = |status: PaymentStatus| {
                views
                    .iter()
                    .filter(|v| v.status == status.as_str())
                    .cloned()
                    .collect::<Vec<_>>()
            };
            let admin = AdminPayments {
                paid: by_status(PaymentStatus::Paid),
                pending: by_status(PaymentStatus::Pending),
                overdue: by_status(PaymentStatus::Overdue),
                total_collected: payments.iter().map(|p| p.amount_paid).sum(),
                total_outstanding: views.iter().map(|v| v.balance.max(0.0)).sum(),
            };
            Ok(Json(PaymentsResponse {
                admin: Some(admin),
                parent: None,
            }))
        }
        PaymentAccess::Children(_) => {
            let mut parent = ParentPayments {
                child: None,
                payment: None,
            };
            if let Some(child_id) = subject_student(&user, query.child.as_deref())? {
                parent.child = users.iter().find(|u| u.id == child_id).map(UserView::from);
                parent.payment = payments
                    .iter()
                    .find(|p| p.student_id == child_id)
                    .map(|p| payment_view(p, &users));
            }
            Ok(Json(PaymentsResponse {
                admin: None,
                parent: Some(parent),
            }))
        }
        PaymentAccess::None => Err(ApiError::forbidden("You cannot view fee records.")),
    }
}

/// Simulated payment of a child's outstanding balance. Nothing is recorded.
#[utoipa::path(
    post,
    path = "/payments/{id}/pay",
    params(("id" = String, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Payment acknowledged", body = PaymentReceipt),
        (status = 403, description = "Not the payer for this record", body = ErrorBody),
        (status = 404, description = "No such payment", body = ErrorBody),
        (status = 422, description = "Nothing left to pay", body = ErrorBody)
    ),
    tag = "payments"
)]
pub async fn pay_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(payment_id): Path<String>,
) -> Result<Json<PaymentReceipt>, ApiError> {
    require_route(&user, Route::Payments)?;
    let payment = state
        .store
        .get_payment(&payment_id)
        .await
        .map_err(|e| ApiError::lookup(e, format!("Payment '{payment_id}'"), PAYMENTS_PAGE))?;

    if !can_pay_for(&user, &payment.student_id) {
        return Err(ApiError::forbidden("You can only pay fees for your own children."));
    }
    let summary = payment_summary(&payment);
    if summary.balance <= 0.0 {
        return Err(ApiError::invalid("amount", "There is no outstanding balance to pay."));
    }

    info!("Acknowledged simulated payment of {} for {}", summary.balance, payment.id);
    Ok(Json(PaymentReceipt {
        payment_id: payment.id,
        amount: summary.balance,
        message: format!(
            "Thank you. Your payment of {} has been processed.",
            format_currency(summary.balance)
        ),
    }))
}

/// The fee reminder or overdue notice letter for one record (Admin).
#[utoipa::path(
    get,
    path = "/payments/{id}/notice",
    params(("id" = String, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Notice text", body = FeeNotice),
        (status = 403, description = "Only administrators can issue notices", body = ErrorBody),
        (status = 404, description = "No such payment", body = ErrorBody)
    ),
    tag = "payments"
)]
pub async fn fee_notice_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(payment_id): Path<String>,
) -> Result<Json<FeeNotice>, ApiError> {
    require_route(&user, Route::Payments)?;
    if payment_access(&user) != PaymentAccess::All {
        return Err(ApiError::forbidden("Only administrators can issue fee notices."));
    }
    let payment = state
        .store
        .get_payment(&payment_id)
        .await
        .map_err(|e| ApiError::lookup(e, format!("Payment '{payment_id}'"), PAYMENTS_PAGE))?;
    let users = state.store.list_users().await?;

    let student_name = name_of(&users, &payment.student_id);
    Ok(Json(fee_notice(&payment, student_name, Utc::now().date_naive())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_is_grouped_with_two_decimals() {
        assert_eq!(format_currency(5500.0), "$5,500.00");
        assert_eq!(format_currency(2500.5), "$2,500.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-500.0), "-$500.00");
    }

    #[test]
    fn overdue_notice_is_formal() {
        let payment = Payment {
            id: "payment-10".into(),
            student_id: "user-student-10".into(),
            semester: "Fall 2024".into(),
            amount_due: 5500.0,
            amount_paid: 500.0,
            status: PaymentStatus::Overdue,
            due_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        };
        let today = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
        let notice = fee_notice(&payment, "Jamie Fox", today);
        assert_eq!(notice.file_name, "fee_Jamie_Fox_overdue_report.txt");
        assert!(notice.content.starts_with("Fee Overdue Report - 10/01/2024"));
        assert!(notice.content.contains("Balance: $5,000.00"));
        assert!(notice.content.contains("formal notice"));
    }
}
