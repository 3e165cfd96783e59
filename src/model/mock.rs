use log::info;
use std::time::Duration;

use super::CompletionError;

// First matching row wins; keywords are matched against the lower-cased prompt.
const CANNED_REPLIES: &[(&[&str], &str)] = &[
    (
        &["inventory", "stock"],
        "I recommend implementing a just-in-time inventory system to reduce storage costs while ensuring you don't run out of popular items. You can use the Inventory Management module in the Shop CRM to set up automatic reorder points based on historical sales data.",
    ),
    (
        &["sales", "revenue"],
        "Based on your recent sales data, I notice that accessories have a higher profit margin than main products. Consider creating bundle deals that pair main products with accessories to increase your average order value. You can track the performance of these bundles in the Sales Analytics dashboard.",
    ),
    (
        &["customer", "client"],
        "Customer retention is often more cost-effective than acquisition. Consider implementing a loyalty program that rewards repeat purchases. The Shop CRM can help you identify your most valuable customers so you can target them with special offers.",
    ),
    (
        &["employee", "staff"],
        "To improve employee productivity, consider implementing performance metrics tied to incentives. You can use the Employee Management module to track key performance indicators and automatically calculate bonuses based on sales targets or customer satisfaction scores.",
    ),
    (
        &["marketing", "advertis"],
        "For small retail shops, localized marketing often yields the highest return on investment. Consider partnering with nearby complementary businesses for cross-promotions, or setting up targeted social media ads with a 3-5 mile radius around your store location.",
    ),
    (
        &["cost", "expense"],
        "I've analyzed your expense patterns, and I noticed your packaging costs are higher than industry benchmarks. Consider sourcing from alternative suppliers or buying in bulk to negotiate better rates. You might also explore eco-friendly options which can be both cost-effective and appealing to environmentally conscious customers.",
    ),
];

const FALLBACK_REPLY: &str = "I'm here to help with any aspect of your shop management! I can assist with inventory optimization, sales strategies, customer relationship management, employee scheduling, marketing ideas, or cost reduction. Just let me know what specific area you'd like insights on.";

/// Offline stand-in that answers from a fixed table after a delay.
pub struct MockClient {
    delay: Duration,
}

impl MockClient {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn generate_response(&self, prompt: &str) -> Result<String, CompletionError> {
        info!("Using mock responses");
        tokio::time::sleep(self.delay).await;
        Ok(canned_reply(prompt).to_string())
    }
}

fn canned_reply(prompt: &str) -> &'static str {
    let prompt = prompt.to_lowercase();
    CANNED_REPLIES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| prompt.contains(k)))
        .map(|(_, reply)| *reply)
        .unwrap_or(FALLBACK_REPLY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_pick_the_matching_topic() {
        assert!(canned_reply("How much STOCK should I keep?").contains("just-in-time"));
        assert!(canned_reply("revenue is down").contains("bundle deals"));
        assert!(canned_reply("a difficult client").contains("loyalty program"));
        assert!(canned_reply("staff scheduling").contains("performance metrics"));
        assert!(canned_reply("Advertising ideas?").contains("localized marketing"));
        assert!(canned_reply("cut expenses").contains("packaging costs"));
    }

    #[test]
    fn earlier_topics_win_over_later_ones() {
        // "inventory" is checked before "cost".
        assert!(canned_reply("inventory cost").contains("just-in-time"));
    }

    #[test]
    fn unknown_prompt_gets_the_generic_reply() {
        assert_eq!(canned_reply("hello"), FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn mock_client_answers_after_its_delay() {
        let client = MockClient::new(Duration::from_millis(5));
        let reply = client.generate_response("sales tips").await.unwrap();
        assert!(reply.contains("Sales Analytics"));
    }
}
