//! In-memory cart service for store tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use eshop_core::{OrderId, ProductId, UserId};

use crate::api::{
    AddItemRequest, CartApiError, CartResponse, CartService, CreateOrderRequest, OrderResponse,
    ProductRef, RawCartItem,
};

/// Cart service operations, for counting calls and injecting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Get,
    Add,
    Remove,
    Update,
    Clear,
    CreateOrder,
}

#[derive(Default)]
struct FakeState {
    lines: Vec<AddItemRequest>,
    calls: HashMap<Op, usize>,
    failing: HashSet<Op>,
    stock_limit: Option<u32>,
    get_delay: Option<Duration>,
    clear_delay: Option<Duration>,
    partial_clear_failure: bool,
    last_clear_user: Option<UserId>,
    orders: Vec<CreateOrderRequest>,
}

/// Cart service backed by a vector of lines.
///
/// Merges repeated adds into one line and optionally caps quantities, like the
/// real backend. Product ids are returned in extended-JSON form.
#[derive(Default)]
pub struct FakeCartService {
    state: Mutex<FakeState>,
}

impl FakeCartService {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the call and fail it if requested.
    fn enter(&self, op: Op) -> Result<(), CartApiError> {
        let mut state = self.lock();
        *state.calls.entry(op).or_default() += 1;
        if state.failing.contains(&op) {
            return Err(unavailable());
        }
        Ok(())
    }

    pub fn calls(&self, op: Op) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    pub fn fail(&self, op: Op) {
        self.lock().failing.insert(op);
    }

    pub fn set_stock_limit(&self, limit: Option<u32>) {
        self.lock().stock_limit = limit;
    }

    pub fn set_get_delay(&self, delay: Option<Duration>) {
        self.lock().get_delay = delay;
    }

    /// Delay clear acknowledgements. The cart is emptied before the delay.
    pub fn set_clear_delay(&self, delay: Option<Duration>) {
        self.lock().clear_delay = delay;
    }

    /// Make the next clear drop one line and then fail.
    pub fn fail_clear_partially(&self) {
        self.lock().partial_clear_failure = true;
    }

    /// Change a line behind the store's back.
    pub fn set_quantity_directly(&self, product_id: &ProductId, quantity: u32) {
        if let Some(line) = self
            .lock()
            .lines
            .iter_mut()
            .find(|l| &l.product_id == product_id)
        {
            line.quantity = quantity;
        }
    }

    pub fn last_clear_user(&self) -> Option<UserId> {
        self.lock().last_clear_user.clone()
    }

    pub fn orders(&self) -> Vec<CreateOrderRequest> {
        self.lock().orders.clone()
    }
}

fn unavailable() -> CartApiError {
    CartApiError::Api {
        status: 503,
        message: "Service unavailable".to_string(),
    }
}

fn cap(quantity: u32, limit: Option<u32>) -> u32 {
    limit.map_or(quantity, |limit| quantity.min(limit))
}

impl CartService for FakeCartService {
    async fn get_cart(&self) -> Result<CartResponse, CartApiError> {
        self.enter(Op::Get)?;

        // Read before sleeping so a delayed response carries the older cart.
        let (items, delay) = {
            let state = self.lock();
            let items: Vec<RawCartItem> = state
                .lines
                .iter()
                .map(|line| RawCartItem {
                    product: Some(ProductRef::ObjectId {
                        oid: line.product_id.to_string(),
                    }),
                    name: Some(line.name.clone()),
                    price: Some(line.price.amount()),
                    image: Some(line.image.clone()),
                    category: Some(line.category.clone()),
                    quantity: Some(i64::from(line.quantity)),
                })
                .collect();
            (items, state.get_delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(CartResponse { items: Some(items) })
    }

    async fn add_item(&self, request: &AddItemRequest) -> Result<(), CartApiError> {
        self.enter(Op::Add)?;
        let mut state = self.lock();
        let limit = state.stock_limit;
        match state
            .lines
            .iter_mut()
            .find(|l| l.product_id == request.product_id)
        {
            Some(line) => line.quantity = cap(line.quantity + request.quantity, limit),
            None => {
                let mut line = request.clone();
                line.quantity = cap(line.quantity, limit);
                state.lines.push(line);
            }
        }
        Ok(())
    }

    async fn remove_item(&self, product_id: &ProductId) -> Result<(), CartApiError> {
        self.enter(Op::Remove)?;
        self.lock().lines.retain(|l| &l.product_id != product_id);
        Ok(())
    }

    async fn update_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), CartApiError> {
        self.enter(Op::Update)?;
        let mut state = self.lock();
        let limit = state.stock_limit;
        let line = state
            .lines
            .iter_mut()
            .find(|l| &l.product_id == product_id)
            .ok_or_else(|| CartApiError::Api {
                status: 404,
                message: "Item not found in cart".to_string(),
            })?;
        line.quantity = cap(quantity, limit);
        Ok(())
    }

    async fn clear(&self, user_id: Option<&UserId>) -> Result<(), CartApiError> {
        self.enter(Op::Clear)?;
        let (result, delay) = {
            let mut state = self.lock();
            state.last_clear_user = user_id.cloned();
            let result = if state.partial_clear_failure {
                state.partial_clear_failure = false;
                if !state.lines.is_empty() {
                    state.lines.remove(0);
                }
                Err(unavailable())
            } else {
                state.lines.clear();
                Ok(())
            };
            (result, state.clear_delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<OrderResponse, CartApiError> {
        self.enter(Op::CreateOrder)?;
        let mut state = self.lock();
        state.orders.push(request.clone());
        Ok(OrderResponse {
            id: Some(OrderId::new(format!("order-{}", state.orders.len()))),
        })
    }
}
