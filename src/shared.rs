//! Shared pool handles and the pool registry
//!
//! A [`SharedPool`] serialises every operation on one pool behind a mutex held
//! for the whole call, ledger transfers included, so concurrent callers
//! observe some total order of complete operations.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use log::debug;

use crate::{AccountId, AssetLedger, Pool, PoolError, PoolId, PoolState, Result, SwapDirection, TokenLedger};

/// Cloneable, thread-safe handle to one pool
pub struct SharedPool<A = TokenLedger, B = TokenLedger>
where
    A: AssetLedger,
    B: AssetLedger,
{
    id: PoolId,
    inner: Arc<Mutex<Pool<A, B>>>,
}

impl<A, B> Clone for SharedPool<A, B>
where
    A: AssetLedger,
    B: AssetLedger,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, B> SharedPool<A, B>
where
    A: AssetLedger,
    B: AssetLedger,
{
    pub fn new(pool: Pool<A, B>) -> Self {
        Self {
            id: pool.id().clone(),
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    pub fn id(&self) -> &PoolId {
        &self.id
    }

    /// Run `f` with exclusive access to the pool
    pub fn with<R>(&self, f: impl FnOnce(&mut Pool<A, B>) -> Result<R>) -> Result<R> {
        let mut guard = self.inner.lock().map_err(|_| PoolError::LockPoisoned)?;
        f(&mut guard)
    }

    pub fn add_liquidity(&self, caller: &AccountId, amount_a: u128, amount_b: u128) -> Result<u128> {
        self.with(|pool| pool.add_liquidity(caller, amount_a, amount_b))
    }

    pub fn remove_liquidity(&self, caller: &AccountId, share_amount: u128) -> Result<(u128, u128)> {
        self.with(|pool| pool.remove_liquidity(caller, share_amount))
    }

    pub fn swap_a_for_b(&self, caller: &AccountId, amount_in: u128) -> Result<u128> {
        self.with(|pool| pool.swap_a_for_b(caller, amount_in))
    }

    pub fn swap_b_for_a(&self, caller: &AccountId, amount_in: u128) -> Result<u128> {
        self.with(|pool| pool.swap_b_for_a(caller, amount_in))
    }

    pub fn swap_exact_in(
        &self,
        caller: &AccountId,
        direction: SwapDirection,
        amount_in: u128,
        min_amount_out: u128,
    ) -> Result<u128> {
        self.with(|pool| pool.swap_exact_in(caller, direction, amount_in, min_amount_out))
    }

    pub fn get_reserves(&self) -> Result<(u128, u128)> {
        self.with(|pool| Ok(pool.get_reserves()))
    }

    pub fn get_price(&self) -> Result<u128> {
        self.with(|pool| Ok(pool.get_price()))
    }

    pub fn snapshot(&self) -> Result<PoolState> {
        self.with(|pool| Ok(pool.snapshot()))
    }
}

/// Pools addressed by id
pub struct PoolRegistry<A = TokenLedger, B = TokenLedger>
where
    A: AssetLedger,
    B: AssetLedger,
{
    pools: BTreeMap<PoolId, SharedPool<A, B>>,
}

impl<A, B> Default for PoolRegistry<A, B>
where
    A: AssetLedger,
    B: AssetLedger,
{
    fn default() -> Self {
        Self {
            pools: BTreeMap::new(),
        }
    }
}

impl<A, B> PoolRegistry<A, B>
where
    A: AssetLedger,
    B: AssetLedger,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pool under its configured id
    pub fn register(&mut self, pool: Pool<A, B>) -> Result<SharedPool<A, B>> {
        let id = pool.id().clone();
        if self.pools.contains_key(&id) {
            return Err(PoolError::DuplicatePool(id.0));
        }
        let handle = SharedPool::new(pool);
        self.pools.insert(id.clone(), handle.clone());
        debug!("registered pool {}", id);
        Ok(handle)
    }

    pub fn get(&self, id: &PoolId) -> Result<SharedPool<A, B>> {
        self.pools
            .get(id)
            .cloned()
            .ok_or_else(|| PoolError::UnknownPool(id.0.clone()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &PoolId> + '_ {
        self.pools.keys()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
