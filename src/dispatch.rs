// Launching a payment link on the current platform.
//
// Android + a known wallet: one intent:// URI naming the package, with the
// Play Store listing as the browser fallback.
// Everywhere else: the wallet's own scheme, then the canonical upi:// URI if
// that first navigation errors. No further retries; once a navigation is
// issued the OS owns it.

use crate::error::Error;
use crate::payment::{build_links, PaymentDescriptor, PaymentLinks, WalletApp};
use tracing::{info, warn};

pub const PLAY_STORE_DETAILS: &str = "https://play.google.com/store/apps/details";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
    Desktop,
}

impl Platform {
    /// Sniff a browser-style user agent string.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        if ua.contains("android") {
            Platform::Android
        } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
            Platform::Ios
        } else {
            Platform::Desktop
        }
    }

    /// A user agent describing the machine we are running on.
    pub fn host_user_agent() -> String {
        format!("scratch-pay ({}; {})", std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Whether intent:// deep links are understood here.
    pub fn supports_intents(&self) -> bool {
        matches!(self, Platform::Android)
    }
}

/// Issues a navigation. Success only means the OS accepted the URI.
pub trait Navigator {
    fn assign(&mut self, uri: &str) -> Result<(), Error>;
}

/// Hands URIs to the desktop/OS URI handler.
#[derive(Debug, Default)]
pub struct SystemNavigator;

impl Navigator for SystemNavigator {
    fn assign(&mut self, uri: &str) -> Result<(), Error> {
        open::that(uri).map_err(|e| Error::Navigation { uri: uri.to_string(), reason: e.to_string() })
    }
}

pub fn play_store_url(package: &str) -> String {
    format!("{PLAY_STORE_DETAILS}?id={}", urlencoding::encode(package))
}

/// `intent://pay?<query>#Intent;scheme=upi;package=<pkg>;S.browser_fallback_url=<store>;end`
pub fn intent_uri(links: &PaymentLinks, package: &str) -> String {
    format!(
        "intent://pay?{}#Intent;scheme=upi;package={};S.browser_fallback_url={};end",
        links.query,
        package,
        urlencoding::encode(&play_store_url(package)),
    )
}

#[derive(Clone, Copy, Debug)]
pub struct PlatformDispatcher {
    platform: Platform,
}

impl PlatformDispatcher {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    pub fn for_user_agent(user_agent: &str) -> Self {
        Self::new(Platform::from_user_agent(user_agent))
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Navigate synchronously; call from inside the user's own action.
    pub fn dispatch<N: Navigator + ?Sized>(&self, links: &PaymentLinks, nav: &mut N) {
        if self.platform.supports_intents() {
            if let Some(package) = links.target.package() {
                let uri = intent_uri(links, package);
                info!(target = links.target.display_name(), "launching payment intent");
                if let Err(e) = nav.assign(&uri) {
                    warn!("payment intent was not accepted: {e}");
                }
                return;
            }
        }

        info!(target = links.target.display_name(), "launching payment link");
        if let Err(e) = nav.assign(&links.app) {
            warn!("app link failed, falling back to canonical upi link: {e}");
            if let Err(e) = nav.assign(&links.canonical) {
                warn!("canonical upi link failed too: {e}");
            }
        }
    }

    /// Build the links for `desc` and dispatch them to `target`.
    pub fn pay<N: Navigator + ?Sized>(&self, desc: &PaymentDescriptor, target: WalletApp, nav: &mut N) {
        let links = build_links(desc, target);
        self.dispatch(&links, nav);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_sniffing() {
        let android = "Mozilla/5.0 (Linux; ANDROID 14; Pixel 8) AppleWebKit/537.36";
        let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
        assert_eq!(Platform::from_user_agent(android), Platform::Android);
        assert_eq!(Platform::from_user_agent(iphone), Platform::Ios);
        assert_eq!(Platform::from_user_agent("Mozilla/5.0 (X11; Linux x86_64)"), Platform::Desktop);
        assert!(!Platform::Ios.supports_intents());
    }

    #[test]
    fn store_url_names_the_package() {
        assert_eq!(
            play_store_url("com.phonepe.app"),
            "https://play.google.com/store/apps/details?id=com.phonepe.app"
        );
    }

    #[test]
    fn intent_uri_layout() {
        let links = build_links(&PaymentDescriptor::default(), WalletApp::Bhim);
        let uri = intent_uri(&links, "in.org.npci.upiapp");
        assert_eq!(
            uri,
            format!(
                "intent://pay?{}#Intent;scheme=upi;package=in.org.npci.upiapp;\
                 S.browser_fallback_url=https%3A%2F%2Fplay.google.com%2Fstore%2Fapps%2Fdetails%3Fid%3Din.org.npci.upiapp;end",
                links.query
            )
        );
    }
}
