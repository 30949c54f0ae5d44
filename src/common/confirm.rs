use std::collections::HashMap;
use std::fmt;

/// Handle for a destructive action awaiting an explicit yes/no.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfirmToken(u64);

impl fmt::Display for ConfirmToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Two-phase gate for destructive actions.
///
/// `request` parks an action and hands back a token; the action only runs when
/// the caller redeems that token with `take`. Tokens are single use, and
/// `cancel` drops the parked action without running it.
#[derive(Debug)]
pub struct ConfirmationGate<A> {
    next: u64,
    pending: HashMap<u64, A>,
}

impl<A> Default for ConfirmationGate<A> {
    fn default() -> Self {
        Self {
            next: 1,
            pending: HashMap::new(),
        }
    }
}

impl<A> ConfirmationGate<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, action: A) -> ConfirmToken {
        let token = self.next;
        self.next += 1;
        self.pending.insert(token, action);
        ConfirmToken(token)
    }

    pub fn take(&mut self, token: ConfirmToken) -> Option<A> {
        self.pending.remove(&token.0)
    }

    pub fn cancel(&mut self, token: ConfirmToken) -> bool {
        self.pending.remove(&token.0).is_some()
    }

    pub fn peek(&self, token: ConfirmToken) -> Option<&A> {
        self.pending.get(&token.0)
    }

    pub fn is_pending(&self, token: ConfirmToken) -> bool {
        self.pending.contains_key(&token.0)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
