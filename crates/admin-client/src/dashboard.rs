//! Aggregates shown on the dashboard overview.
//!
//! Everything here is a pure projection of the cart line items and the user
//! list; nothing is cached.

use serde::Serialize;

use crate::{CartLineItem, User};

/// Lower bounds of the price buckets, in dollars.
const PRICE_BOUNDS: [u32; 5] = [0, 50, 100, 200, 500];
/// Rows contributed by each source to the recent activity feed.
const ACTIVITY_PER_SOURCE: usize = 2;
/// Length of the recent activity feed.
const ACTIVITY_LIMIT: usize = 4;

/// Headline numbers of the overview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Cart line items across all carts.
    pub total_items: usize,
    /// Users in the list.
    pub total_users: usize,
    /// Users flagged active.
    pub active_users: usize,
    /// Sum of line totals.
    pub total_revenue: f64,
    /// Revenue per line item; zero without items.
    pub avg_order_value: f64,
    /// Share of active users in percent; zero without users.
    pub active_percentage: f64,
}

fn as_f64(count: usize) -> f64 {
    u32::try_from(count).map_or(f64::from(u32::MAX), f64::from)
}

impl DashboardStats {
    /// Compute the overview from the current rows.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "revenue figures are fractional dollar amounts"
    )]
    pub fn compute(items: &[CartLineItem], users: &[User]) -> Self {
        let total_revenue: f64 = items.iter().map(|item| item.total).sum();
        let avg_order_value = if items.is_empty() {
            0.0
        } else {
            total_revenue / as_f64(items.len())
        };
        let active_users = users.iter().filter(|user| user.fields.is_active).count();
        let active_percentage = if users.is_empty() {
            0.0
        } else {
            as_f64(active_users) * 100.0 / as_f64(users.len())
        };
        Self {
            total_items: items.len(),
            total_users: users.len(),
            active_users,
            total_revenue,
            avg_order_value,
            active_percentage,
        }
    }
}

/// Number of line items in one price range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceBucket {
    /// Range label such as `$50-99` or `$500+`.
    pub label: String,
    /// Items whose unit price falls in the range.
    pub count: usize,
}

fn bucket_label(lower: u32, upper: Option<u32>) -> String {
    upper.map_or_else(
        || format!("${lower}+"),
        |upper| format!("${lower}-{}", upper.saturating_sub(1)),
    )
}

/// Count items per price range: `[0,50) [50,100) [100,200) [200,500)
/// [500,∞)`.
#[must_use]
pub fn price_distribution(items: &[CartLineItem]) -> Vec<PriceBucket> {
    let uppers = PRICE_BOUNDS.iter().skip(1).copied().map(Some);
    PRICE_BOUNDS
        .iter()
        .copied()
        .zip(uppers.chain(std::iter::once(None)))
        .map(|(lower, upper)| {
            let count = items
                .iter()
                .filter(|item| {
                    item.price >= f64::from(lower)
                        && upper.is_none_or(|bound| item.price < f64::from(bound))
                })
                .count();
            PriceBucket {
                label: bucket_label(lower, upper),
                count,
            }
        })
        .collect()
}

/// Where an activity entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivitySource {
    /// A cart line item.
    Cart,
    /// A user record.
    User,
}

/// One row of the recent activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    /// Row origin.
    pub source: ActivitySource,
    /// Product title or user name.
    pub subject: String,
    /// What happened.
    pub action: String,
}

/// The first carts rows followed by the first users, capped at four.
#[must_use]
pub fn recent_activity(items: &[CartLineItem], users: &[User]) -> Vec<ActivityEntry> {
    let carts = items
        .iter()
        .take(ACTIVITY_PER_SOURCE)
        .map(|item| ActivityEntry {
            source: ActivitySource::Cart,
            subject: item.title.clone(),
            action: format!("Added to cart - ${}", item.price),
        });
    let people = users.iter().take(ACTIVITY_PER_SOURCE).map(|user| {
        let status = if user.fields.is_active {
            "Active user"
        } else {
            "Inactive user"
        };
        ActivityEntry {
            source: ActivitySource::User,
            subject: user.name().to_owned(),
            action: format!("{status} - {}", user.fields.department),
        }
    });
    carts.chain(people).take(ACTIVITY_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{UserFields, UserId};
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    fn item(title: &str, price: f64, total: f64) -> CartLineItem {
        CartLineItem {
            product_id: 1,
            title: title.to_owned(),
            price,
            quantity: 1,
            total,
            discount_percentage: 0.0,
            discounted_total: total,
            thumbnail: String::new(),
            cart_id: 1,
            user_id: 1,
        }
    }

    fn user(name: &str, is_active: bool) -> User {
        User {
            id: Some(UserId::new(name)),
            fields: UserFields {
                name: name.to_owned(),
                email: format!("{name}@example.com"),
                gender: "other".to_owned(),
                department: "Sales".to_owned(),
                phone: "5550100123".to_owned(),
                is_active,
                start_date: NaiveDate::default(),
            },
        }
    }

    #[fixture]
    fn items() -> Vec<CartLineItem> {
        vec![
            item("Mascara", 9.5, 19.0),
            item("Lamp", 49.99, 49.99),
            item("Chair", 50.0, 100.0),
            item("Desk", 199.0, 199.0),
            item("Laptop", 500.0, 1000.0),
        ]
    }

    #[rstest]
    fn stats_sum_line_totals(items: Vec<CartLineItem>) {
        let users = vec![user("ada", true), user("bob", false), user("cy", true), user("di", true)];

        let stats = DashboardStats::compute(&items, &users);

        assert_eq!(stats.total_items, 5);
        assert_eq!(stats.total_users, 4);
        assert_eq!(stats.active_users, 3);
        assert!((stats.total_revenue - 1367.99).abs() < 1e-9);
        assert!((stats.avg_order_value - 273.598).abs() < 1e-9);
        assert!((stats.active_percentage - 75.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn empty_inputs_report_zero() {
        let stats = DashboardStats::compute(&[], &[]);

        assert_eq!(stats.total_items, 0);
        assert!(stats.avg_order_value.abs() < f64::EPSILON);
        assert!(stats.active_percentage.abs() < f64::EPSILON);
    }

    #[rstest]
    fn stats_serialise_the_active_share() {
        let users = vec![user("ada", true), user("bob", false)];

        let value = serde_json::to_value(DashboardStats::compute(&[], &users)).expect("encodes");

        assert_eq!(value["activeUsers"], 1);
        assert_eq!(value["activePercentage"], 50.0);
    }

    #[rstest]
    fn prices_fall_into_half_open_buckets(items: Vec<CartLineItem>) {
        let buckets = price_distribution(&items);

        let summary: Vec<(&str, usize)> = buckets
            .iter()
            .map(|bucket| (bucket.label.as_str(), bucket.count))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("$0-49", 2),
                ("$50-99", 1),
                ("$100-199", 1),
                ("$200-499", 0),
                ("$500+", 1),
            ]
        );
    }

    #[rstest]
    fn activity_takes_two_of_each(items: Vec<CartLineItem>) {
        let users = vec![user("ada", true), user("bob", false), user("cy", true)];

        let feed = recent_activity(&items, &users);

        let actions: Vec<&str> = feed.iter().map(|entry| entry.action.as_str()).collect();
        assert_eq!(
            actions,
            vec![
                "Added to cart - $9.5",
                "Added to cart - $49.99",
                "Active user - Sales",
                "Inactive user - Sales",
            ]
        );
    }

    #[rstest]
    fn activity_without_carts_lists_users_only() {
        let users = vec![user("ada", true)];

        let feed = recent_activity(&[], &users);

        assert_eq!(feed.len(), 1);
        assert_eq!(feed.first().map(|entry| entry.source), Some(ActivitySource::User));
    }
}
