// UPI payment links.
// Pure string building: no I/O, same descriptor + target => same links.

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAYEE_ID: &str = "7378351383@ybl";
pub const DEFAULT_PAYEE_NAME: &str = "Reward Payment";
pub const DEFAULT_NOTE: &str = "Cashback reward";
pub const DEFAULT_CURRENCY: &str = "INR";
pub const DEFAULT_AMOUNT: f64 = 650.0;

pub const CANONICAL_PREFIX: &str = "upi://pay";

/// A finite, non-negative amount in major currency units.
/// Printed the way a plain decimal reads: `650`, `650.5`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Amount(f64);

impl Amount {
    pub fn new(value: f64) -> Result<Self, Error> {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidAmount(value.to_string()));
        }
        Ok(Self(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().parse().map_err(|_| Error::InvalidAmount(s.to_string()))?;
        Self::new(value)
    }
}

/// Parameters embedded in a payment request.
#[derive(Clone, Debug, PartialEq)]
pub struct PaymentDescriptor {
    pub payee_id: String,
    pub payee_name: String,
    pub amount: Amount,
    pub currency: String,
    pub note: String,
}

impl PaymentDescriptor {
    /// The reward payment. A missing or blank payee id falls back to the
    /// merchant default; a given one is trimmed.
    pub fn reward(payee_id: Option<&str>, amount: Amount) -> Self {
        let payee_id = payee_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_PAYEE_ID);
        Self {
            payee_id: payee_id.to_string(),
            payee_name: DEFAULT_PAYEE_NAME.to_string(),
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            note: DEFAULT_NOTE.to_string(),
        }
    }
}

impl Default for PaymentDescriptor {
    fn default() -> Self {
        Self::reward(None, Amount(DEFAULT_AMOUNT))
    }
}

/// The wallets we know how to address directly, plus "any UPI app".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WalletApp {
    PhonePe,
    Paytm,
    GooglePay,
    Bhim,
    Generic,
}

impl WalletApp {
    pub const KNOWN: [WalletApp; 4] =
        [WalletApp::PhonePe, WalletApp::Paytm, WalletApp::GooglePay, WalletApp::Bhim];

    /// Map an Android package id; anything unrecognised (or empty) is Generic.
    pub fn from_package(package: &str) -> Self {
        match package.trim() {
            "com.phonepe.app" => WalletApp::PhonePe,
            "net.one97.paytm" => WalletApp::Paytm,
            "com.google.android.apps.nbu.paisa.user" => WalletApp::GooglePay,
            "in.org.npci.upiapp" => WalletApp::Bhim,
            _ => WalletApp::Generic,
        }
    }

    pub fn package(&self) -> Option<&'static str> {
        match self {
            WalletApp::PhonePe => Some("com.phonepe.app"),
            WalletApp::Paytm => Some("net.one97.paytm"),
            WalletApp::GooglePay => Some("com.google.android.apps.nbu.paisa.user"),
            WalletApp::Bhim => Some("in.org.npci.upiapp"),
            WalletApp::Generic => None,
        }
    }

    /// `scheme://authority[/path]` placed ahead of the shared query string.
    pub fn scheme_prefix(&self) -> &'static str {
        match self {
            WalletApp::PhonePe => "phonepe://pay",
            WalletApp::Paytm => "paytmmp://pay",
            WalletApp::GooglePay => "tez://upi/pay",
            WalletApp::Bhim => "bhim://pay",
            WalletApp::Generic => CANONICAL_PREFIX,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WalletApp::PhonePe => "PhonePe",
            WalletApp::Paytm => "Paytm",
            WalletApp::GooglePay => "Google Pay",
            WalletApp::Bhim => "BHIM",
            WalletApp::Generic => "UPI",
        }
    }
}

/// Every URI form of one payment request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentLinks {
    pub target: WalletApp,
    /// `pa=..&pn=..&am=..&cu=..&tn=..`
    pub query: String,
    /// `upi://pay?<query>`
    pub canonical: String,
    /// The target's own scheme, or the canonical URI for Generic.
    pub app: String,
}

/// `pa`, `pn`, `am`, `cu`, `tn`, in that order, each percent-encoded.
pub fn query_string(desc: &PaymentDescriptor) -> String {
    format!(
        "pa={}&pn={}&am={}&cu={}&tn={}",
        urlencoding::encode(&desc.payee_id),
        urlencoding::encode(&desc.payee_name),
        urlencoding::encode(&desc.amount.to_string()),
        urlencoding::encode(&desc.currency),
        urlencoding::encode(&desc.note),
    )
}

pub fn build_links(desc: &PaymentDescriptor, target: WalletApp) -> PaymentLinks {
    let query = query_string(desc);
    PaymentLinks {
        target,
        canonical: format!("{CANONICAL_PREFIX}?{query}"),
        app: format!("{}?{query}", target.scheme_prefix()),
        query,
    }
}
