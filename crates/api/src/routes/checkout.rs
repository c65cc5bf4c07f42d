//! Checkout session handlers.
//!
//! Every endpoint here operates on the calling client's server-side session
//! and returns the full session view, so the front end re-renders from one
//! response instead of patching local state.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use helpnet_core::{
    AddressId, AllocationId, DraftItem, InstallmentPlan, MAX_INSTALLMENTS, Money,
    NotificationKind, PaymentAllocation, PaymentKind, PlanError, ProductId, installment_plans,
};
use serde::{Deserialize, Serialize};

use crate::db::RepositoryError;
use crate::db::orders::{NewOrder, NewOrderItem, NewOrderPayment};
use crate::error::{ApiError, Result};
use crate::middleware::ClientAuth;
use crate::routes::addresses::AddressView;
use crate::routes::orders::{self, OrderDetail};
use crate::services::checkout::{AppliedCoupon, CheckoutSession, FreightState, SubmitError};
use crate::services::notifications::Recipient;
use crate::services::receipts;
use crate::state::AppState;

/// Full session state as the front end renders it.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub items: Vec<DraftItem>,
    pub subtotal: Money,
    pub freight: Money,
    pub discount: Money,
    pub total: Money,
    pub coupon: Option<AppliedCoupon>,
    pub address: Option<AddressView>,
    pub freight_state: FreightState,
    pub methods: Vec<MethodView>,
    pub allocated: Money,
    pub remaining: Money,
    pub can_submit: bool,
}

#[derive(Debug, Serialize)]
pub struct MethodView {
    pub id: AllocationId,
    pub kind: PaymentKind,
    pub label: &'static str,
    pub amount: Money,
}

impl From<&PaymentAllocation> for MethodView {
    fn from(allocation: &PaymentAllocation) -> Self {
        Self {
            id: allocation.id,
            kind: allocation.kind,
            label: allocation.label(),
            amount: allocation.amount,
        }
    }
}

impl From<CheckoutSession> for CheckoutView {
    fn from(session: CheckoutSession) -> Self {
        let total = session.draft.total();
        let allocated = session.plan.allocated_total();
        let can_submit = session.plan.can_submit(session.address.is_some(), total);
        Self {
            items: session.draft.items().to_vec(),
            subtotal: session.draft.subtotal(),
            freight: session.draft.freight(),
            discount: session.draft.discount(),
            total,
            coupon: session.coupon,
            address: session.address.map(AddressView::from),
            freight_state: session.freight,
            methods: session.plan.allocations().iter().map(MethodView::from).collect(),
            allocated,
            remaining: (total - allocated).max_zero(),
            can_submit,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ItemInput {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct ItemsRequest {
    pub items: Vec<ItemInput>,
}

#[derive(Debug, Deserialize)]
pub struct SetAddressRequest {
    pub address_id: AddressId,
}

#[derive(Debug, Deserialize)]
pub struct SetCouponRequest {
    /// Absent or blank clears the coupon
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddMethodRequest {
    pub kind: PaymentKind,
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: Money,
}

#[derive(Debug, Deserialize)]
pub struct InstallmentsQuery {
    pub amount: Money,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    /// Installment count for the credit-card split, when one exists
    #[serde(default)]
    pub card_installments: Option<u32>,
}

fn plan_error(e: PlanError) -> ApiError {
    match e {
        PlanError::LastMethod => {
            ApiError::Checkout("Pelo menos uma forma de pagamento deve permanecer".to_string())
        }
        PlanError::UnknownMethod => ApiError::NotFound("Forma de pagamento"),
    }
}

fn submit_error(e: SubmitError) -> ApiError {
    let message = match e {
        SubmitError::EmptyCart => "Seu carrinho está vazio",
        SubmitError::NoAddress => "Selecione um endereço de entrega",
        SubmitError::Unbalanced => {
            "Os valores das formas de pagamento não cobrem o total do pedido"
        }
    };
    ApiError::Checkout(message.to_string())
}

/// GET /api/checkout
pub async fn show(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
) -> Json<CheckoutView> {
    Json(state.checkout().snapshot(client_id).into())
}

/// PUT /api/checkout/items
///
/// Replaces the whole cart. Lines for the same product are merged; prices
/// are read from the catalog, never from the request.
pub async fn set_items(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
    Json(req): Json<ItemsRequest>,
) -> Result<Json<CheckoutView>> {
    let mut merged: Vec<(ProductId, u32)> = Vec::new();
    for input in &req.items {
        if input.quantity == 0 {
            return Err(ApiError::Validation(
                "Quantidade deve ser pelo menos 1".to_string(),
            ));
        }
        match merged.iter_mut().find(|(id, _)| *id == input.product_id) {
            Some((_, quantity)) => *quantity += input.quantity,
            None => merged.push((input.product_id, input.quantity)),
        }
    }

    let ids: Vec<ProductId> = merged.iter().map(|(id, _)| *id).collect();
    let products = state.products().list_by_ids(&ids).await?;

    let mut items = Vec::with_capacity(merged.len());
    for (product_id, quantity) in merged {
        let product = products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or(ApiError::NotFound("Produto"))?;
        items.push(DraftItem {
            product_id,
            vendor_id: product.vendor_id,
            quantity,
            unit_price: product.price,
        });
    }

    Ok(Json(state.checkout().set_items(client_id, items).into()))
}

/// PUT /api/checkout/address
///
/// Selects a delivery address and kicks off the freight quote. The response
/// reports the quote as pending; a later GET sees it resolved or failed.
pub async fn set_address(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
    Json(req): Json<SetAddressRequest>,
) -> Result<Json<CheckoutView>> {
    let address = state
        .addresses()
        .find_for_client(req.address_id, client_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => ApiError::NotFound("Endereço"),
            other => other.into(),
        })?;

    let (session, generation) = state.checkout().set_address(client_id, address);

    let checkout = state.checkout().clone();
    tokio::spawn(async move {
        checkout.fetch_and_apply_freight(client_id, generation).await;
    });

    Ok(Json(session.into()))
}

/// PUT /api/checkout/coupon
pub async fn set_coupon(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
    Json(req): Json<SetCouponRequest>,
) -> Result<Json<CheckoutView>> {
    let code = req.code.as_deref().map(str::trim).unwrap_or_default();
    if code.is_empty() {
        return Ok(Json(state.checkout().set_coupon(client_id, None).into()));
    }

    let code = code.to_uppercase();
    let coupon = state
        .coupons()
        .find_by_code(&code)
        .await?
        .ok_or(ApiError::NotFound("Cupom"))?;
    if !coupon.is_redeemable(Utc::now()) {
        return Err(ApiError::Validation("Cupom expirado ou esgotado".to_string()));
    }

    let applied = AppliedCoupon {
        id: coupon.id,
        code: coupon.code,
        discount_percent: coupon.discount_percent,
    };
    Ok(Json(state.checkout().set_coupon(client_id, Some(applied)).into()))
}

/// POST /api/checkout/methods
///
/// Adding a kind that is already present is a no-op, same response shape.
pub async fn add_method(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
    Json(req): Json<AddMethodRequest>,
) -> Json<CheckoutView> {
    let (_, session) = state.checkout().add_method(client_id, req.kind);
    Json(session.into())
}

/// PUT /api/checkout/methods/{id}
pub async fn update_method(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
    Path(id): Path<AllocationId>,
    Json(req): Json<AmountRequest>,
) -> Result<Json<CheckoutView>> {
    let session = state
        .checkout()
        .update_amount(client_id, id, req.amount)
        .map_err(plan_error)?;
    Ok(Json(session.into()))
}

/// DELETE /api/checkout/methods/{id}
pub async fn remove_method(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
    Path(id): Path<AllocationId>,
) -> Result<Json<CheckoutView>> {
    let session = state
        .checkout()
        .remove_method(client_id, id)
        .map_err(plan_error)?;
    Ok(Json(session.into()))
}

/// POST /api/checkout/distribute
pub async fn distribute(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
) -> Json<CheckoutView> {
    Json(state.checkout().distribute(client_id).into())
}

/// POST /api/checkout/methods/{id}/cash-discount
pub async fn cash_discount(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
    Path(id): Path<AllocationId>,
) -> Result<Json<CheckoutView>> {
    let session = state
        .checkout()
        .apply_cash_discount(client_id, id)
        .map_err(plan_error)?;
    Ok(Json(session.into()))
}

/// GET /api/checkout/installments?amount=1200.00
pub async fn installments(
    ClientAuth(_client_id): ClientAuth,
    Query(query): Query<InstallmentsQuery>,
) -> Json<Vec<InstallmentPlan>> {
    Json(installment_plans(query.amount).collect())
}

/// POST /api/checkout/submit
///
/// Writes the order, generates receipts, clears the session, and pushes a
/// success notification. Failures leave the session untouched so the client
/// can correct and retry.
pub async fn submit(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
    Json(req): Json<SubmitRequest>,
) -> Result<impl IntoResponse> {
    let installments = req.card_installments.unwrap_or(1);
    if installments == 0 || installments > MAX_INSTALLMENTS {
        return Err(ApiError::Validation(
            "Número de parcelas inválido".to_string(),
        ));
    }

    let data = state
        .checkout()
        .prepare_submission(client_id)
        .map_err(submit_error)?;

    // Product names re-read at submit time so receipts carry current names
    // and deactivated products abort before any write
    let ids: Vec<ProductId> = data.draft.items().iter().map(|i| i.product_id).collect();
    let products = state.products().list_by_ids(&ids).await?;

    let mut items = Vec::with_capacity(data.draft.items().len());
    for draft_item in data.draft.items() {
        let product = products
            .iter()
            .find(|p| p.id == draft_item.product_id)
            .ok_or_else(|| {
                ApiError::Checkout("Um dos produtos não está mais disponível".to_string())
            })?;
        items.push(NewOrderItem {
            product_id: draft_item.product_id,
            vendor_id: draft_item.vendor_id,
            product_name: product.name.clone(),
            quantity: i32::try_from(draft_item.quantity).unwrap_or(i32::MAX),
            unit_price: draft_item.unit_price,
        });
    }

    let now = Utc::now();
    let payments: Vec<NewOrderPayment> = data
        .allocations
        .iter()
        .filter(|allocation| allocation.amount.is_positive())
        .map(|allocation| {
            let receipt = receipts::generate(allocation.kind, now);
            NewOrderPayment {
                kind: allocation.kind,
                amount: allocation.amount.round_centavos(),
                installments: if allocation.kind == PaymentKind::Cartao {
                    i32::try_from(installments).unwrap_or(1)
                } else {
                    1
                },
                pix_code: receipt.pix_code,
                boleto_line: receipt.boleto_line,
                boleto_due_date: receipt.boleto_due_date,
                card_authorization: receipt.card_authorization,
            }
        })
        .collect();

    let new = NewOrder {
        client_id,
        ship_cep: data.address.cep.clone(),
        ship_street: data.address.street.clone(),
        ship_number: data.address.number.clone(),
        ship_complement: data.address.complement.clone(),
        ship_district: data.address.district.clone(),
        ship_city: data.address.city.clone(),
        ship_state: data.address.state.clone(),
        subtotal: data.draft.subtotal(),
        freight: data.draft.freight(),
        freight_service: data.freight_service.clone(),
        discount: data.draft.discount(),
        total: data.draft.total(),
        coupon_code: data.coupon.as_ref().map(|c| c.code.clone()),
    };
    let coupon_id = data.coupon.as_ref().map(|c| c.id);

    let order = match state.orders().submit(&new, &items, &payments, coupon_id).await {
        Ok(order) => order,
        Err(RepositoryError::Conflict(message)) => {
            state.notifications().notify(
                Recipient::Client(client_id),
                message.clone(),
                NotificationKind::Error,
            );
            return Err(ApiError::Conflict(message));
        }
        Err(e) => {
            state.notifications().notify(
                Recipient::Client(client_id),
                "Não foi possível concluir o pedido. Tente novamente.",
                NotificationKind::Error,
            );
            return Err(e.into());
        }
    };

    state.checkout().clear(client_id);
    state.notifications().notify(
        Recipient::Client(client_id),
        format!("Pedido #{} realizado com sucesso!", order.id),
        NotificationKind::Success,
    );
    tracing::info!(%client_id, order_id = %order.id, total = %new.total, "order submitted");

    let detail: OrderDetail = orders::load_detail(&state, order).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// DELETE /api/checkout
pub async fn abandon(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
) -> StatusCode {
    state.checkout().clear(client_id);
    StatusCode::NO_CONTENT
}
