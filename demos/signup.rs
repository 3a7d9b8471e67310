//! Signup form walkthrough.
//!
//! Wires a form to a local channel, subscribes the way a render layer would,
//! and drives it through a few edits.
//!
//! Run with: RUST_LOG=form_state=debug cargo run --example signup

use std::rc::Rc;

use form_state::{
    FieldConfig, FormEvent, FormManager, FormOptions, LocalChannel, ValidationResult,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

fn email(value: &String) -> ValidationResult {
    if value.contains('@') {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid("Enter a valid email")
    }
}

fn main() -> form_state::Result<()> {
    init_logging();

    let channel = Rc::new(LocalChannel::<FormEvent<String>>::new());
    let mut form = FormManager::with_options(
        vec![
            FieldConfig::new("email", String::new()).validator(email),
            FieldConfig::new("nickname", String::new()),
            FieldConfig::new("referral", String::new()).hidden(true),
        ],
        channel,
        FormOptions::default().with_history(20),
    )?;

    let _data = form.on_data_changed(|data| println!("data      {data:?}"));
    let _validation = form.on_validation_changed(|result| {
        println!("invalid   {:?}: {:?}", result.invalid_fields[0].name, result.message);
    });
    let _email = form.on_field_changed("email", |state| {
        println!("email     {:?} touched={}", state.value, state.is_touched);
    })?;

    println!("valid? {}", form.validate());

    form.set_field_value("email", "ada".to_string())?;
    form.set_field_value("email", "ada@example.com".to_string())?;
    form.show_field("referral")?;
    println!("valid? {}", form.is_valid());

    form.set_error("nickname", true, "Nickname already taken")?;
    println!("valid? {}", form.is_valid());

    // No validator on nickname: the error stays until withdrawn.
    form.set_field_value("nickname", "ada99".to_string())?;
    println!("valid? {}", form.is_valid());
    form.set_error("nickname", false, "")?;
    form.undo()?;
    println!("after undo {:?}", form.get_data());

    Ok(())
}
