use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::types::{CountryCode, PlanEntry};

pub const NO_PRICES_MESSAGE: &str = "❌ No prices were parsed.";

const DEFAULT_PLAN_GROUP: &str = "monthly";
const PLAN_GROUP_ATTR: &str = "data-plan-group";

#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid selector '{selector}': {message}")]
    Selector {
        selector: &'static str,
        message: String,
    },
}

struct Selectors {
    group: Selector,
    card: Selector,
    name: Selector,
    price: Selector,
    any_card: Selector,
    any_name: Selector,
    any_price: Selector,
}

impl Selectors {
    fn compile() -> Result<Self, ParseError> {
        Ok(Self {
            group: selector("section[data-plan-group]")?,
            card: selector(".max-plan-picker-group__card")?,
            name: selector("h3")?,
            price: selector("h4")?,
            any_card: selector(".max-plan-picker-group__card, .plan-card")?,
            any_name: selector("h3, .plan-name")?,
            any_price: selector("h4, .plan-price")?,
        })
    }
}

static SELECTORS: LazyLock<Result<Selectors, ParseError>> = LazyLock::new(Selectors::compile);

/// Compiled once per process; a compile failure is kept and handed to every caller.
fn selectors() -> Result<&'static Selectors, ParseError> {
    SELECTORS.as_ref().map_err(Clone::clone)
}

fn selector(css: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Selector {
        selector: css,
        message: e.to_string(),
    })
}

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_text(element: ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(elem_text)
        .filter(|t| !t.is_empty())
}

/// Nearest `data-plan-group`, looking at the card itself and then its ancestors.
fn closest_plan_group(card: ElementRef) -> Option<String> {
    std::iter::once(card)
        .chain(card.ancestors().filter_map(ElementRef::wrap))
        .find_map(|e| e.value().attr(PLAN_GROUP_ATTR))
        .filter(|g| !g.is_empty())
        .map(str::to_string)
}

#[derive(Default)]
struct PlanCollector {
    seen: HashSet<(String, String, String)>,
    plans: Vec<PlanEntry>,
}

impl PlanCollector {
    fn push(&mut self, plan_group: &str, name: &str, price: &str) {
        let key = (plan_group.to_string(), name.to_string(), price.to_string());
        if self.seen.insert(key) {
            self.plans.push(PlanEntry::new(plan_group, name, price));
        } else {
            log::debug!("Skipping duplicate plan {plan_group}/{name}/{price}");
        }
    }
}

/// Extracts plan cards from the plan picker markup.
///
/// Plan cards are read from `section[data-plan-group]` containers. Only when
/// the page has no such container are loose cards searched for, with their
/// group taken from the nearest ancestor that carries one.
pub fn parse_plans(html: &str) -> Result<Vec<PlanEntry>, ParseError> {
    let selectors = selectors()?;
    let document = Html::parse_document(html);
    let mut collector = PlanCollector::default();

    let groups: Vec<ElementRef> = document.select(&selectors.group).collect();

    if !groups.is_empty() {
        log::debug!("Found {} plan group(s)", groups.len());
        for group in groups {
            let plan_group = group.value().attr(PLAN_GROUP_ATTR).unwrap_or_default();
            for card in group.select(&selectors.card) {
                let (Some(name), Some(price)) = (
                    first_text(card, &selectors.name),
                    first_text(card, &selectors.price),
                ) else {
                    continue;
                };
                collector.push(plan_group, &name, &price);
            }
        }
    } else {
        log::debug!("No plan groups found, falling back to loose plan cards");
        for card in document.select(&selectors.any_card) {
            let (Some(name), Some(price)) = (
                first_text(card, &selectors.any_name),
                first_text(card, &selectors.any_price),
            ) else {
                continue;
            };
            let plan_group =
                closest_plan_group(card).unwrap_or_else(|| DEFAULT_PLAN_GROUP.to_string());
            collector.push(&plan_group, &name, &price);
        }
    }

    Ok(collector.plans)
}

pub fn format_summary(country: &CountryCode, plans: &[PlanEntry]) -> String {
    let mut lines = vec![format!("**Max {country} subscription prices:**")];
    lines.extend(plans.iter().map(ToString::to_string));
    lines.join("\n")
}

/// Never fails: a missing page, a parse problem or an empty result all come
/// back as an empty list with a message explaining why.
pub fn extract_prices(html: Option<&str>, country: &CountryCode) -> (Vec<PlanEntry>, String) {
    let Some(html) = html.filter(|h| !h.trim().is_empty()) else {
        return (
            Vec::new(),
            format!("❌ Unable to fetch page content ({country})"),
        );
    };

    match parse_plans(html) {
        Ok(plans) if !plans.is_empty() => {
            let summary = format_summary(country, &plans);
            (plans, summary)
        }
        Ok(_) => (Vec::new(), NO_PRICES_MESSAGE.to_string()),
        Err(e) => {
            log::error!("Parse error: {e}");
            (Vec::new(), format!("❌ Parse error: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn code(s: &str) -> CountryCode {
        s.parse().expect("valid country code")
    }

    #[test]
    fn test_parse_grouped_fixture() {
        let html =
            fs::read_to_string("fixtures/plans_grouped.html").expect("Failed to read fixture");

        let plans = parse_plans(&html).expect("Failed to parse plans");

        assert_eq!(plans.len(), 5, "duplicate Premium card should be dropped");
        assert_eq!(plans[0], PlanEntry::new("monthly", "Basic With Ads", "S$11.98"));
        assert_eq!(plans[1].name, "Standard");
        assert_eq!(plans[2].name, "Premium");
        assert_eq!(plans[3].plan_group, "yearly");
        assert_eq!(plans[3].label, "Yearly");
        assert!(plans[..3].iter().all(|p| p.label == "Monthly"));
    }

    #[test]
    fn test_parse_loose_card_fixture() {
        let html =
            fs::read_to_string("fixtures/plans_loose.html").expect("Failed to read fixture");

        let plans = parse_plans(&html).expect("Failed to parse plans");

        assert_eq!(
            plans,
            vec![
                PlanEntry::new("yearly", "Standard", "$169.99"),
                PlanEntry::new("monthly", "Basic", "$9.99"),
                PlanEntry::new("monthly", "Ultimate", "$20.99"),
            ]
        );
    }

    #[test]
    fn test_two_groups_in_document_order() {
        let html = r#"
            <section data-plan-group="monthly">
              <div class="max-plan-picker-group__card"><h3>Basic</h3><h4>$9.99</h4></div>
            </section>
            <section data-plan-group="yearly">
              <div class="max-plan-picker-group__card"><h3>Basic</h3><h4>$99.99</h4></div>
            </section>"#;

        let (plans, summary) = extract_prices(Some(html), &code("us"));

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].plan_group, "monthly");
        assert_eq!(plans[0].label, "Monthly");
        assert_eq!(plans[1].plan_group, "yearly");
        assert_eq!(plans[1].label, "Yearly");
        assert_eq!(
            summary,
            "**Max US subscription prices:**\n✅ Basic (Monthly): **$9.99**\n✅ Basic (Yearly): **$99.99**"
        );
    }

    #[test]
    fn test_duplicate_cards_collapse() {
        let html = r#"
            <section data-plan-group="monthly">
              <div class="max-plan-picker-group__card"><h3>Basic</h3><h4>$9.99</h4></div>
              <div class="max-plan-picker-group__card"><h3> Basic </h3><h4>$9.99</h4></div>
            </section>"#;

        let (plans, _) = extract_prices(Some(html), &code("US"));
        assert_eq!(plans.len(), 1);
    }

    #[test]
    fn test_near_duplicates_are_kept() {
        let html = r#"
            <section data-plan-group="monthly">
              <div class="max-plan-picker-group__card"><h3>Basic</h3><h4>$9.99</h4></div>
              <div class="max-plan-picker-group__card"><h3>Basic</h3><h4>$ 9.99</h4></div>
            </section>"#;

        let (plans, _) = extract_prices(Some(html), &code("US"));
        assert_eq!(plans.len(), 2);
    }

    #[test]
    fn test_cards_missing_name_or_price_are_skipped() {
        let html = r#"
            <section data-plan-group="monthly">
              <div class="max-plan-picker-group__card"><h3>Basic</h3></div>
              <div class="max-plan-picker-group__card"><h4>$9.99</h4></div>
              <div class="max-plan-picker-group__card"><h3>   </h3><h4>$1</h4></div>
              <div class="max-plan-picker-group__card"><h3>Standard</h3><h4>$15.99</h4></div>
            </section>"#;

        let (plans, _) = extract_prices(Some(html), &code("US"));
        assert_eq!(plans, vec![PlanEntry::new("monthly", "Standard", "$15.99")]);
    }

    #[test]
    fn test_groups_present_disable_fallback() {
        let html = r#"
            <section data-plan-group="monthly"></section>
            <div class="plan-card"><span class="plan-name">Basic</span><span class="plan-price">$9.99</span></div>"#;

        let (plans, message) = extract_prices(Some(html), &code("US"));
        assert!(plans.is_empty());
        assert_eq!(message, NO_PRICES_MESSAGE);
    }

    #[test]
    fn test_missing_html_names_country() {
        let (plans, message) = extract_prices(None, &code("SG"));
        assert!(plans.is_empty());
        assert!(message.contains("SG"));

        let (plans, message) = extract_prices(Some("   "), &code("SG"));
        assert!(plans.is_empty());
        assert!(message.contains("SG"));
    }

    #[test]
    fn test_no_matching_elements() {
        let html = "<html><body><h3>Basic</h3><h4>$9.99</h4></body></html>";
        let (plans, message) = extract_prices(Some(html), &code("SG"));
        assert!(plans.is_empty());
        assert_eq!(message, NO_PRICES_MESSAGE);
    }

    #[test]
    fn test_malformed_markup_does_not_panic() {
        let html = "<section data-plan-group=monthly><div class='max-plan-picker-group__card'><h3>Basic<h4>$9.99";
        let (plans, _) = extract_prices(Some(html), &code("SG"));
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].price, "$9.99");
    }

    #[test]
    fn test_unknown_group_label() {
        let html = r#"
            <section data-plan-group="quarterly">
              <div class="max-plan-picker-group__card"><h3>Basic</h3><h4>$25</h4></div>
            </section>"#;

        let (plans, _) = extract_prices(Some(html), &code("US"));
        assert_eq!(plans[0].plan_group, "quarterly");
        assert_eq!(plans[0].label, "Yearly");
    }

    #[test]
    fn test_empty_group_attribute_defaults_to_monthly() {
        let html = r#"
            <div data-plan-group="">
              <div class="plan-card"><h3>Basic</h3><h4>$1</h4></div>
            </div>"#;

        let plans = parse_plans(html).expect("Failed to parse plans");
        assert_eq!(plans, vec![PlanEntry::new("monthly", "Basic", "$1")]);
        assert_eq!(plans[0].label, "Monthly");
    }

    #[test]
    fn test_selectors_are_compiled_once() {
        let first = selectors().expect("selectors compile");
        let second = selectors().expect("selectors compile");
        assert!(std::ptr::eq(first, second));
    }
}
