use activation::activation::ProActivation;
use activation::errors::ActivationResult;
use activation::storage::CredentialStore;

/// Command-line probe for the activation subsystem.
///
/// Loads and verifies any stored credential, prints the current entitlement,
/// and — if a code is given as the first argument — submits it:
///
/// ```text
/// profitcalc_client PRO2024
/// ```
///
/// The real application embeds `ProActivation` in its startup path instead.
#[tokio::main]
async fn main() -> ActivationResult<()> {
    env_logger::init();

    let activation = ProActivation::new(CredentialStore::new());
    activation.init().await;
    println!("Pro entitlement: {}", activation.is_entitled());

    if let Some(code) = std::env::args().nth(1) {
        if activation.submit_code(&code).await? {
            println!("Activation succeeded, pro features enabled.");
        } else {
            println!("Activation code not recognized.");
        }
    }

    Ok(())
}
