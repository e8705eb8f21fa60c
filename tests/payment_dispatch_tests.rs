use scratch_pay::dispatch::{Navigator, Platform, PlatformDispatcher};
use scratch_pay::error::Error;
use scratch_pay::payment::{build_links, Amount, PaymentDescriptor, WalletApp};

const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 Chrome/126.0 Mobile";
const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Records every navigation; optionally refuses the first `fail_first` of them.
#[derive(Default)]
struct RecordingNavigator {
    issued: Vec<String>,
    fail_first: usize,
}

impl Navigator for RecordingNavigator {
    fn assign(&mut self, uri: &str) -> Result<(), Error> {
        self.issued.push(uri.to_string());
        if self.issued.len() <= self.fail_first {
            return Err(Error::Navigation { uri: uri.to_string(), reason: "no handler".into() });
        }
        Ok(())
    }
}

#[test]
fn canonical_uri_for_the_reward_descriptor() {
    let desc = PaymentDescriptor {
        payee_id: "7378351383@ybl".into(),
        payee_name: "Reward Payment".into(),
        amount: Amount::new(650.0).unwrap(),
        currency: "INR".into(),
        note: "Cashback reward".into(),
    };
    assert_eq!(
        build_links(&desc, WalletApp::Generic).canonical,
        "upi://pay?pa=7378351383%40ybl&pn=Reward%20Payment&am=650&cu=INR&tn=Cashback%20reward"
    );
}

#[test]
fn android_with_known_wallet_issues_one_intent() {
    let dispatcher = PlatformDispatcher::for_user_agent(ANDROID_UA);
    assert_eq!(dispatcher.platform(), Platform::Android);
    let mut nav = RecordingNavigator::default();

    dispatcher.pay(&PaymentDescriptor::default(), WalletApp::PhonePe, &mut nav);

    assert_eq!(nav.issued.len(), 1);
    let uri = &nav.issued[0];
    assert!(uri.starts_with("intent://pay?pa=7378351383%40ybl&"));
    assert!(uri.contains("#Intent;scheme=upi;package=com.phonepe.app;"));
    assert!(uri.contains("S.browser_fallback_url=https%3A%2F%2Fplay.google.com%2Fstore%2Fapps%2Fdetails%3Fid%3Dcom.phonepe.app;end"));
}

#[test]
fn android_intent_failure_is_not_retried() {
    let dispatcher = PlatformDispatcher::for_user_agent(ANDROID_UA);
    let mut nav = RecordingNavigator { fail_first: 1, ..Default::default() };
    dispatcher.pay(&PaymentDescriptor::default(), WalletApp::Bhim, &mut nav);
    assert_eq!(nav.issued.len(), 1);
}

#[test]
fn desktop_uses_the_app_scheme() {
    let dispatcher = PlatformDispatcher::for_user_agent(DESKTOP_UA);
    let mut nav = RecordingNavigator::default();
    dispatcher.pay(&PaymentDescriptor::default(), WalletApp::GooglePay, &mut nav);
    assert_eq!(nav.issued.len(), 1);
    assert!(nav.issued[0].starts_with("tez://upi/pay?pa="));
}

#[test]
fn failed_app_scheme_falls_back_to_canonical_once() {
    let dispatcher = PlatformDispatcher::for_user_agent(DESKTOP_UA);
    let desc = PaymentDescriptor::default();
    let links = build_links(&desc, WalletApp::Paytm);

    let mut nav = RecordingNavigator { fail_first: 1, ..Default::default() };
    dispatcher.dispatch(&links, &mut nav);
    assert_eq!(nav.issued, vec![links.app.clone(), links.canonical.clone()]);

    // Both tiers failing stops after the second attempt.
    let mut nav = RecordingNavigator { fail_first: 5, ..Default::default() };
    dispatcher.dispatch(&links, &mut nav);
    assert_eq!(nav.issued.len(), 2);
}

#[test]
fn unknown_target_resolves_to_canonical_uri() {
    let target = WalletApp::from_package("com.example.unknownwallet");
    assert_eq!(target, WalletApp::Generic);

    for ua in [ANDROID_UA, DESKTOP_UA] {
        let dispatcher = PlatformDispatcher::for_user_agent(ua);
        let mut nav = RecordingNavigator::default();
        dispatcher.pay(&PaymentDescriptor::default(), target, &mut nav);
        assert_eq!(
            nav.issued,
            vec!["upi://pay?pa=7378351383%40ybl&pn=Reward%20Payment&am=650&cu=INR&tn=Cashback%20reward".to_string()]
        );
    }
}

#[test]
fn manual_payee_id_is_encoded() {
    let dispatcher = PlatformDispatcher::for_user_agent(DESKTOP_UA);
    let mut nav = RecordingNavigator::default();
    let desc = PaymentDescriptor::reward(Some(" friend+1@okaxis "), Amount::new(650.0).unwrap());
    dispatcher.pay(&desc, WalletApp::Generic, &mut nav);
    assert!(nav.issued[0].starts_with("upi://pay?pa=friend%2B1%40okaxis&pn="));
}
