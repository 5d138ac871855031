use areakit_core::data::{FaqData, FaqItem};

fn fill(text: &str, suburb: &str, fact: &str) -> String {
    text.replace("{{suburb}}", suburb).replace("{{fact}}", fact)
}

/// FAQ for one suburb: its overrides first, then the templates.
///
/// Overrides and facts are looked up by display name, then by slug. A
/// template is dropped when an override asks the same question.
pub fn suburb_faq(data: &FaqData, name: &str, slug: &str) -> Vec<FaqItem> {
    let fact = data
        .facts
        .get(name)
        .or_else(|| data.facts.get(slug))
        .map(String::as_str)
        .unwrap_or("");

    let overrides: Vec<FaqItem> = data
        .overrides
        .get(name)
        .or_else(|| data.overrides.get(slug))
        .map(|items| {
            items
                .iter()
                .map(|item| FaqItem {
                    question: fill(&item.question, name, fact),
                    answer: fill(&item.answer, name, fact),
                })
                .collect()
        })
        .unwrap_or_default();

    let templated = data
        .templates
        .iter()
        .map(|t| FaqItem {
            question: fill(&t.question, name, fact),
            answer: fill(&t.answer, name, fact),
        })
        .filter(|t| !overrides.iter().any(|o| o.question == t.question));

    let mut out = overrides.clone();
    out.extend(templated);
    out
}
