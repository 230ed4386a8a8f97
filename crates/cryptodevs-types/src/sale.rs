//! Sale phase derivation.
//!
//! The contract owns every flag; [`SaleSnapshot`] is the client's cached
//! mirror and [`derive_ui_state`] maps it to exactly one [`SaleState`].

use serde::Serialize;

/// What the page should offer the connected user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleState {
    /// No wallet session.
    Disconnected,
    /// Connected as contract owner before the presale: offer "start presale".
    OwnerPreStart,
    WaitingNotStarted,
    /// Whitelisted addresses may mint.
    PresaleOpen,
    PublicOpen,
}

/// Strict decision tree. Owner status only matters before the presale starts.
pub fn derive_ui_state(
    connected: bool,
    is_owner: bool,
    presale_started: bool,
    presale_ended: bool,
) -> SaleState {
    if !connected {
        return SaleState::Disconnected;
    }
    match (presale_started, presale_ended) {
        (false, _) if is_owner => SaleState::OwnerPreStart,
        (false, _) => SaleState::WaitingNotStarted,
        (true, false) => SaleState::PresaleOpen,
        (true, true) => SaleState::PublicOpen,
    }
}

/// Presale is over once its end timestamp is strictly in the past.
/// Both arguments are seconds since the Unix epoch.
pub fn presale_has_ended(end_secs: u64, now_secs: u64) -> bool {
    end_secs < now_secs
}

/// `"{minted}/{max_supply} have been minted"`.
pub fn minted_label(minted: &str, max_supply: u32) -> String {
    format!("{minted}/{max_supply} have been minted")
}

/// Cached mirror of contract state for one wallet session.
///
/// `presale_started` and `presale_ended` are sticky: the contract sets them
/// once and never clears them, so a later observation of `false` is a stale
/// read and is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleSnapshot {
    pub connected: bool,
    pub is_owner: bool,
    pub presale_started: bool,
    pub presale_ended: bool,
    /// Decimal display string of `tokenIds()`.
    pub tokens_minted: String,
    /// A state-changing call is between submission and confirmation.
    pub loading: bool,
}

impl Default for SaleSnapshot {
    fn default() -> Self {
        Self {
            connected: false,
            is_owner: false,
            presale_started: false,
            presale_ended: false,
            tokens_minted: "0".into(),
            loading: false,
        }
    }
}

impl SaleSnapshot {
    /// Fresh snapshot for a just-connected session.
    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    pub fn state(&self) -> SaleState {
        derive_ui_state(
            self.connected,
            self.is_owner,
            self.presale_started,
            self.presale_ended,
        )
    }

    /// Returns true if the cached value changed.
    pub fn observe_presale_started(&mut self, started: bool) -> bool {
        let before = self.presale_started;
        self.presale_started |= started;
        before != self.presale_started
    }

    /// Returns true if the cached value changed.
    pub fn observe_presale_ended(&mut self, ended: bool) -> bool {
        let before = self.presale_ended;
        self.presale_ended |= ended;
        before != self.presale_ended
    }

    pub fn observe_owner(&mut self, is_owner: bool) -> bool {
        let changed = self.is_owner != is_owner;
        self.is_owner = is_owner;
        changed
    }

    pub fn observe_minted(&mut self, minted: &str) -> bool {
        if self.tokens_minted == minted {
            return false;
        }
        self.tokens_minted = minted.to_string();
        true
    }
}
