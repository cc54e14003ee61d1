//! Account, address, order history and review commands.
//!
//! # Usage
//!
//! ```bash
//! moto-cli register --first-name Ana --last-name Ruiz -e ana@example.com -p 'long enough'
//! moto-cli login -e ana@example.com -p 'long enough'
//! moto-cli addresses add --street "Gran Via 4" --city Bilbao --country Spain --postal-code 48001
//! moto-cli reviews add 17 --rating 5 --comment "Fits perfectly"
//! ```

use secrecy::SecretString;

use moto_parts_core::{AddressId, OrderId, ProductId, ReviewId};
use moto_parts_storefront::AppState;
use moto_parts_storefront::api::Review;
use moto_parts_storefront::error::{clear_sentry_user, set_sentry_user};
use moto_parts_storefront::guard::View;
use moto_parts_storefront::services::account::{LoginForm, ProfileForm, RegistrationForm};
use moto_parts_storefront::services::addresses::AddressForm;
use moto_parts_storefront::services::reviews::ReviewForm;

use super::{CommandError, require, say};

// =============================================================================
// Sign In / Out
// =============================================================================

pub async fn login(state: &AppState, email: String, password: String) -> Result<(), CommandError> {
    require(state.role(), View::Login)?;

    let form = LoginForm {
        email,
        password: SecretString::from(password),
    };
    let landing = state.account().login(&form).await?;

    if let Some(user) = state.session().current_user() {
        set_sentry_user(&user.id);
        say(format_args!("Signed in as user {} ({})", user.id, user.role));
    }
    say(format_args!("Next: {landing:?}"));
    Ok(())
}

pub fn logout(state: &AppState) -> Result<(), CommandError> {
    state.account().logout()?;
    clear_sentry_user();
    say("Signed out");
    Ok(())
}

pub async fn register(
    state: &AppState,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
) -> Result<(), CommandError> {
    require(state.role(), View::Register)?;

    let form = RegistrationForm {
        first_name,
        last_name,
        email,
        password: SecretString::from(password),
    };
    state.account().register(&form).await?;
    say("Account created; you can sign in now");
    Ok(())
}

pub async fn reset_password(state: &AppState, email: &str) -> Result<(), CommandError> {
    require(state.role(), View::ForgotPassword)?;

    state.account().reset_password(email).await?;
    say(format_args!("If {email} has an account, a reset link is on its way"));
    Ok(())
}

// =============================================================================
// Profile
// =============================================================================

pub async fn show_profile(state: &AppState) -> Result<(), CommandError> {
    let user = state.account().profile().await?;
    let form = ProfileForm::from_user(&user);

    say(format_args!("{} {} <{}>", form.first_name, form.last_name, form.email));
    say(format_args!("  phone:      {}", form.phone));
    say(format_args!("  birth date: {}", form.birth_date));
    say(format_args!("  gender:     {}", form.gender));
    say(format_args!("  role:       {}", user.role));
    Ok(())
}

pub async fn update_profile(state: &AppState, form: ProfileForm) -> Result<(), CommandError> {
    state.account().update_profile(form).await?;
    say("Profile updated");
    Ok(())
}

// =============================================================================
// Addresses
// =============================================================================

pub async fn list_addresses(state: &AppState) -> Result<(), CommandError> {
    let addresses = state.account().addresses().await?;
    if addresses.is_empty() {
        say("No addresses yet");
    }
    for address in addresses {
        say(format_args!("#{:<5} {}", address.id, address.one_line()));
    }
    Ok(())
}

pub async fn add_address(state: &AppState, form: AddressForm) -> Result<(), CommandError> {
    state.account().add_address(form).await?;
    say("Address added");
    Ok(())
}

pub async fn update_address(
    state: &AppState,
    id: AddressId,
    form: AddressForm,
) -> Result<(), CommandError> {
    state.account().update_address(id, form).await?;
    say(format_args!("Address {id} updated"));
    Ok(())
}

pub async fn remove_address(state: &AppState, id: AddressId) -> Result<(), CommandError> {
    state.account().remove_address(id).await?;
    say(format_args!("Address {id} removed"));
    Ok(())
}

// =============================================================================
// Order History
// =============================================================================

pub async fn orders(state: &AppState) -> Result<(), CommandError> {
    let orders = state.account().orders().await?;
    if orders.is_empty() {
        say("No orders yet");
    }
    for order in orders {
        say(format_args!(
            "#{:<5} {:<16} {:<10} {:>10}  delivery {}",
            order.id,
            order
                .order_date
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            order.status,
            order.total_amount.to_string(),
            order.delivery_date,
        ));
    }
    Ok(())
}

pub async fn order_lines(state: &AppState, id: OrderId) -> Result<(), CommandError> {
    for line in state.account().order_lines(id).await? {
        say(format_args!(
            "{:>3} x {:<30} {:>10} {:>10}",
            line.quantity,
            line.product_name
                .unwrap_or_else(|| format!("product {}", line.product_id)),
            line.unit_price.to_string(),
            line.subtotal.to_string(),
        ));
    }
    Ok(())
}

// =============================================================================
// Reviews
// =============================================================================

pub async fn product_reviews(state: &AppState, product: ProductId) -> Result<(), CommandError> {
    print_reviews(&state.account().product_reviews(product).await?);
    Ok(())
}

pub async fn my_reviews(state: &AppState) -> Result<(), CommandError> {
    print_reviews(&state.account().my_reviews().await?);
    Ok(())
}

pub async fn post_review(state: &AppState, form: ReviewForm) -> Result<(), CommandError> {
    state.account().post_review(form).await?;
    say("Review posted");
    Ok(())
}

pub async fn edit_review(
    state: &AppState,
    id: ReviewId,
    form: ReviewForm,
) -> Result<(), CommandError> {
    state.account().edit_review(id, form).await?;
    say(format_args!("Review {id} updated"));
    Ok(())
}

pub async fn delete_review(state: &AppState, id: ReviewId) -> Result<(), CommandError> {
    state.account().delete_review(id).await?;
    say(format_args!("Review {id} deleted"));
    Ok(())
}

pub(crate) fn print_reviews(reviews: &[Review]) {
    if reviews.is_empty() {
        say("No reviews");
    }
    for review in reviews {
        let stars = usize::from(review.rating.stars());
        say(format_args!(
            "#{:<5} {:<5} {} ({})",
            review.id,
            "*".repeat(stars),
            review.comment,
            review
                .author
                .clone()
                .unwrap_or_else(|| format!("user {}", review.user_id)),
        ));
    }
}
