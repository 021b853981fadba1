use soroban_sdk::{symbol_short, Address, Env, Symbol};

// ── Storage Keys ─────────────────────────────────────────────────────────────

const OWNER: Symbol = symbol_short!("OWNER");

// ── Core Functions ───────────────────────────────────────────────────────────

/// Records the single owner of the calling contract.
///
/// The owner is write-once: returns `false` (and leaves storage untouched)
/// if an owner has already been recorded.
pub fn set_owner(env: &Env, owner: &Address) -> bool {
    if env.storage().instance().has(&OWNER) {
        return false;
    }
    env.storage().instance().set(&OWNER, owner);
    true
}

/// Returns the recorded owner, if any.
pub fn get_owner(env: &Env) -> Option<Address> {
    env.storage().instance().get(&OWNER)
}

/// Returns true if `caller` is the recorded owner.
///
/// Authentication is the caller's job: the contract must have invoked
/// `caller.require_auth()` beforehand.
pub fn is_owner(env: &Env, caller: &Address) -> bool {
    match get_owner(env) {
        Some(owner) => owner == *caller,
        None => false,
    }
}
