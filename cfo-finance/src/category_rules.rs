//! Deterministic keyword rules mapping receipt text to an expense Category.
//!
//! Used whenever no remote classifier is configured, or the remote call fails.

use cfo_core::Category;

/// Categorize receipt text by case-insensitive substring match.
/// Rules are checked in order; the first hit wins.
pub fn keyword_category(text: &str) -> Category {
    let desc = text.to_lowercase();

    // Housing
    if desc.contains("rent") || desc.contains("apartment") {
        return Category::Housing;
    }

    // Transport
    if desc.contains("uber") || desc.contains("bus") {
        return Category::Transport;
    }

    // Food
    if desc.contains("grocery") || desc.contains("food") {
        return Category::Food;
    }

    // Education
    if desc.contains("tuition") || desc.contains("university") {
        return Category::Education;
    }

    // Subscriptions
    if desc.contains("spotify") || desc.contains("netflix") {
        return Category::Subscription;
    }

    Category::Misc
}

/// Insight attached to keyword-classified expenses
pub fn keyword_insight(category: Category) -> String {
    format!("This looks like a {} expense.", category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rent_is_housing() {
        assert_eq!(keyword_category("Monthly rent payment"), Category::Housing);
        assert_eq!(keyword_category("APARTMENT 4B deposit"), Category::Housing);
    }

    #[test]
    fn test_each_rule() {
        assert_eq!(keyword_category("Uber *TRIP"), Category::Transport);
        assert_eq!(keyword_category("City bus pass"), Category::Transport);
        assert_eq!(keyword_category("Fresh Grocery Mart"), Category::Food);
        assert_eq!(keyword_category("Campus food court"), Category::Food);
        assert_eq!(keyword_category("Fall tuition"), Category::Education);
        assert_eq!(keyword_category("State University bookstore"), Category::Education);
        assert_eq!(keyword_category("Spotify Premium"), Category::Subscription);
        assert_eq!(keyword_category("NETFLIX.COM"), Category::Subscription);
        assert_eq!(keyword_category("Hardware store"), Category::Misc);
        assert_eq!(keyword_category(""), Category::Misc);
    }

    #[test]
    fn test_first_rule_wins() {
        // Housing is checked before Food
        assert_eq!(keyword_category("rent and groceries"), Category::Housing);
        // Transport is checked before Subscription
        assert_eq!(keyword_category("uber one + spotify bundle"), Category::Transport);
    }

    #[test]
    fn test_keyword_insight() {
        assert_eq!(
            keyword_insight(Category::Housing),
            "This looks like a Housing expense."
        );
    }
}
