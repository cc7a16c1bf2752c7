//! Authorization Store
//!
//! Holds the single hook authorized for this module instance and answers
//! both authorization questions against it with the same canonical
//! address encoding.

use crate::domain::{invariant_hook_match, CanonicalAddress, IsmError, IsmResult};
use crate::ports::outbound::{BridgeGateway, CallContextResolver};
use std::sync::Arc;
use tracing::debug;

/// Immutable record of the authorized hook.
pub struct AuthorizationStore<C> {
    hook: CanonicalAddress,
    context: Arc<C>,
}

impl<C> AuthorizationStore<C>
where
    C: CallContextResolver,
{
    /// Bind `hook` to this instance.
    ///
    /// Fails with `InvalidGateway` if the gateway is not a live endpoint.
    pub async fn new<G>(gateway: &G, context: Arc<C>, hook: CanonicalAddress) -> IsmResult<Self>
    where
        G: BridgeGateway + ?Sized,
    {
        if !gateway.is_live().await {
            return Err(IsmError::InvalidGateway {
                reason: "gateway has no live endpoint".to_string(),
            });
        }
        Ok(Self { hook, context })
    }

    /// The authorized hook.
    pub fn hook(&self) -> CanonicalAddress {
        self.hook
    }

    /// True if the in-flight call was forwarded by the bridge from the hook.
    pub fn is_authorized_context(&self) -> bool {
        match self.context.current_call_origin() {
            Some(origin) => {
                debug!("[qc-18] Call context origin {}", origin);
                origin == self.hook
            }
            None => false,
        }
    }

    /// Pure equality against a decoded candidate.
    pub fn matches_hook(&self, candidate: &CanonicalAddress) -> bool {
        invariant_hook_match(&self.hook, candidate).is_ok()
    }
}
