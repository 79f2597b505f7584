use std::collections::HashMap;

use crate::model::{JobDetail, TagsInfo};

const TAG_ARG_PREFIX: &str = "--tag-";

/// Pull ownership metadata out of a job's default arguments.
///
/// Teams without resource tags often smuggle tag-style metadata through
/// `--tag-*` default arguments, so those are merged in as well.
pub fn extract_tags_info(detail: &JobDetail) -> TagsInfo {
    let mut tags: HashMap<String, String> = HashMap::new();

    for (key, value) in &detail.default_arguments {
        if let Some(tag_name) = key.strip_prefix(TAG_ARG_PREFIX) {
            tags.insert(tag_name.to_string(), value.clone());
        }
    }

    let lookup = |primary: &str, fallback: &str| -> String {
        tags.get(primary)
            .or_else(|| tags.get(fallback))
            .map(|v| v.to_lowercase())
            .unwrap_or_else(|| "unknown".to_string())
    };

    TagsInfo {
        environment: lookup("Environment", "env"),
        team: lookup("Team", "team"),
        business_domain: lookup("BusinessDomain", "domain"),
        criticality: lookup("Criticality", "criticality"),
        owner: lookup("Owner", "owner"),
    }
}
