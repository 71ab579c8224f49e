//! Markdown summaries of validated OpenAlex data for tool responses.

use crate::apis::OpenAlexError;
use crate::models::{Author, Institution, Page, Source, Work};

const LIST_AUTHORS: usize = 3;
const MAX_AFFILIATIONS: usize = 5;
const MAX_TOPICS: usize = 10;
const MAX_ACTIVITY_YEARS: usize = 5;

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or("N/A")
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn header<T>(page: &Page<T>, noun: &str) -> String {
    format!(
        "Found {} {} (showing {} results):\n\n",
        page.meta.count,
        noun,
        page.results.len()
    )
}

/// Text for a failed tool call.
pub fn error(action: &str, err: &OpenAlexError) -> String {
    format!("Error {}: [{}] {}", action, err.kind(), err)
}

// ── Works ───────────────────────────────────────────────────────────────────

fn venue(work: &Work) -> &str {
    work.primary_location
        .as_ref()
        .and_then(|loc| loc.source.as_ref())
        .map(|s| s.display_name.as_str())
        .unwrap_or("Unknown")
}

pub fn works_page(page: &Page<Work>) -> String {
    let entries: Vec<String> = page
        .results
        .iter()
        .enumerate()
        .map(|(i, work)| {
            let names: Vec<&str> = work
                .authorships
                .iter()
                .take(LIST_AUTHORS)
                .map(|a| a.author.display_name.as_str())
                .collect();
            let more = if work.authorships.len() > LIST_AUTHORS { ", ..." } else { "" };
            let year = work
                .publication_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "N/A".into());
            let mut entry = format!(
                "{}. {}\n   Authors: {}{}\n   Year: {}, Venue: {}\n   Type: {}, Open Access: {}\n   Citations: {}",
                i + 1,
                work.display_name,
                names.join(", "),
                more,
                year,
                venue(work),
                work.kind,
                yes_no(work.open_access.is_oa),
                work.cited_by_count,
            );
            if let Some(doi) = &work.doi {
                entry.push_str(&format!("\n   DOI: {}", doi));
            }
            entry.push_str(&format!("\n   ID: {}", work.id));
            entry
        })
        .collect();
    header(page, "works") + &entries.join("\n\n")
}

pub fn work(work: &Work) -> String {
    let mut out = format!("# {}\n\n", work.display_name);
    out.push_str(&format!("**Type:** {}\n", work.kind));
    out.push_str(&format!(
        "**Year:** {}\n",
        work.publication_year.map(|y| y.to_string()).unwrap_or_else(|| "N/A".into())
    ));
    out.push_str(&format!("**Date:** {}\n", or_na(work.publication_date.as_deref())));
    out.push_str(&format!("**Language:** {}\n", or_na(work.language.as_deref())));
    out.push_str(&format!("**DOI:** {}\n\n", or_na(work.doi.as_deref())));

    out.push_str("## Authors\n");
    for (i, a) in work.authorships.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} ({})",
            i + 1,
            a.author.display_name,
            a.author_position.as_str()
        ));
        let institutions: Vec<&str> =
            a.institutions.iter().map(|inst| inst.display_name.as_str()).collect();
        if !institutions.is_empty() {
            out.push_str(&format!(" - {}", institutions.join(", ")));
        }
        if let Some(orcid) = &a.author.orcid {
            out.push_str(&format!(" [ORCID: {}]", orcid));
        }
        if a.is_corresponding {
            out.push_str(" (corresponding)");
        }
        out.push('\n');
    }

    out.push_str("\n## Publication Details\n");
    out.push_str(&format!("**Venue:** {}\n", venue(work)));
    if let Some(volume) = &work.biblio.volume {
        out.push_str(&format!("**Volume:** {}\n", volume));
    }
    if let Some(issue) = &work.biblio.issue {
        out.push_str(&format!("**Issue:** {}\n", issue));
    }
    if let Some(first) = &work.biblio.first_page {
        let last = work.biblio.last_page.as_deref().unwrap_or("");
        out.push_str(&format!("**Pages:** {}-{}\n", first, last));
    }

    out.push_str("\n## Open Access\n");
    out.push_str(&format!("**Is OA:** {}\n", yes_no(work.open_access.is_oa)));
    out.push_str(&format!("**OA Status:** {}\n", work.open_access.oa_status));
    if let Some(url) = &work.open_access.oa_url {
        out.push_str(&format!("**OA URL:** {}\n", url));
    }

    if let Some(topic) = &work.primary_topic {
        out.push_str("\n## Primary Topic\n");
        out.push_str(&format!("{} (score: {:.2})\n", topic.display_name, topic.score));
    }

    if !work.keywords.is_empty() {
        let keywords: Vec<&str> = work.keywords.iter().map(|k| k.display_name.as_str()).collect();
        out.push_str("\n## Keywords\n");
        out.push_str(&keywords.join(", "));
        out.push('\n');
    }

    out.push_str("\n## Metrics\n");
    out.push_str(&format!("**Citations:** {}\n", work.cited_by_count));
    out.push_str(&format!("**References:** {}\n", work.referenced_works_count));
    if work.is_retracted {
        out.push_str("**This work has been retracted**\n");
    }

    if let Some(loc) = &work.primary_location {
        if let Some(landing) = &loc.landing_page_url {
            out.push_str("\n## Links\n");
            out.push_str(&format!("**Landing page:** {}\n", landing));
            if let Some(pdf) = &loc.pdf_url {
                out.push_str(&format!("**PDF:** {}\n", pdf));
            }
        }
    }
    out
}

// ── Authors ─────────────────────────────────────────────────────────────────

pub fn authors_page(page: &Page<Author>) -> String {
    let entries: Vec<String> = page
        .results
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let institution = a
                .last_known_institutions
                .first()
                .map(|inst| inst.display_name.as_str())
                .unwrap_or("Unknown");
            let mut entry = format!(
                "{}. {}\n   Institution: {}\n   Works: {}, Citations: {}, h-index: {}",
                i + 1,
                a.display_name,
                institution,
                a.works_count,
                a.cited_by_count,
                a.summary_stats.h_index,
            );
            if let Some(orcid) = &a.orcid {
                entry.push_str(&format!("\n   ORCID: {}", orcid));
            }
            let topics: Vec<&str> = a.topics.iter().take(3).map(|t| t.display_name.as_str()).collect();
            if !topics.is_empty() {
                entry.push_str(&format!("\n   Topics: {}", topics.join(", ")));
            }
            entry.push_str(&format!("\n   ID: {}", a.id));
            entry
        })
        .collect();
    header(page, "authors") + &entries.join("\n\n")
}

/// `2019-2023` for several years, `2021` for one.
fn year_range(years: &[i32]) -> String {
    match (years.iter().min(), years.iter().max()) {
        (Some(lo), Some(hi)) if lo != hi => format!("{}-{}", lo, hi),
        (Some(y), _) => y.to_string(),
        _ => "years unknown".into(),
    }
}

pub fn author(a: &Author) -> String {
    let mut out = format!("# {}\n\n", a.display_name);
    if !a.display_name_alternatives.is_empty() {
        out.push_str(&format!(
            "**Alternative names:** {}\n",
            a.display_name_alternatives.join(", ")
        ));
    }
    if let Some(orcid) = &a.orcid {
        out.push_str(&format!("**ORCID:** {}\n", orcid));
    }
    out.push_str(&format!("**OpenAlex ID:** {}\n\n", a.id));

    out.push_str("## Career Metrics\n");
    out.push_str(&format!("- **Total Works:** {}\n", a.works_count));
    out.push_str(&format!("- **Total Citations:** {}\n", a.cited_by_count));
    out.push_str(&format!("- **h-index:** {}\n", a.summary_stats.h_index));
    out.push_str(&format!("- **i10-index:** {}\n", a.summary_stats.i10_index));
    out.push_str(&format!(
        "- **2-year mean citedness:** {:.2}\n\n",
        a.summary_stats.two_year_mean_citedness
    ));

    if !a.last_known_institutions.is_empty() {
        out.push_str("## Current Affiliations\n");
        for inst in &a.last_known_institutions {
            out.push_str(&format!("- {}", inst.display_name));
            if let Some(cc) = &inst.country_code {
                out.push_str(&format!(" ({})", cc));
            }
            if let Some(kind) = &inst.kind {
                out.push_str(&format!(" - {}", kind));
            }
            out.push('\n');
        }
        out.push('\n');
    }

    if !a.affiliations.is_empty() {
        out.push_str("## Affiliation History\n");
        for aff in a.affiliations.iter().take(MAX_AFFILIATIONS) {
            out.push_str(&format!(
                "- {} ({})",
                aff.institution.display_name,
                year_range(&aff.years)
            ));
            if let Some(cc) = &aff.institution.country_code {
                out.push_str(&format!(" - {}", cc));
            }
            out.push('\n');
        }
        if a.affiliations.len() > MAX_AFFILIATIONS {
            out.push_str(&format!(
                "  ...and {} more\n",
                a.affiliations.len() - MAX_AFFILIATIONS
            ));
        }
        out.push('\n');
    }

    if !a.topics.is_empty() {
        out.push_str("## Research Topics\n");
        for topic in a.topics.iter().take(MAX_TOPICS) {
            out.push_str(&format!("- {} ({} works)\n", topic.display_name, topic.count));
            out.push_str(&format!("  - Field: {}\n", topic.field.display_name));
            out.push_str(&format!("  - Domain: {}\n", topic.domain.display_name));
        }
        if a.topics.len() > MAX_TOPICS {
            out.push_str(&format!("  ...and {} more topics\n", a.topics.len() - MAX_TOPICS));
        }
        out.push('\n');
    }

    if !a.counts_by_year.is_empty() {
        out.push_str("## Recent Activity\n");
        out.push_str("| Year | Works | Citations |\n");
        out.push_str("|------|-------|-----------|\n");
        for year in a.counts_by_year.iter().take(MAX_ACTIVITY_YEARS) {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                year.year, year.works_count, year.cited_by_count
            ));
        }
        out.push('\n');
    }

    out.push_str("## External IDs\n");
    let external = [
        ("ORCID", &a.ids.orcid),
        ("Scopus", &a.ids.scopus),
        ("Twitter", &a.ids.twitter),
        ("Wikipedia", &a.ids.wikipedia),
    ];
    for (label, value) in external {
        if let Some(value) = value {
            out.push_str(&format!("- {}: {}\n", label, value));
        }
    }

    out.push_str("\n## Links\n");
    out.push_str(&format!("- Works API: {}\n", a.works_api_url));
    out.push_str(&format!("- Updated: {}\n", a.updated_date));
    out
}

// ── Institutions ────────────────────────────────────────────────────────────

pub fn institutions_page(page: &Page<Institution>) -> String {
    let entries: Vec<String> = page
        .results
        .iter()
        .enumerate()
        .map(|(i, inst)| {
            let location = inst
                .geo
                .as_ref()
                .map(|g| {
                    [g.city.as_deref(), g.country.as_deref()]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| "Unknown".into());
            let mut entry = format!(
                "{}. {}\n   Type: {}, Country: {}\n   Location: {}\n   Works: {}, Citations: {}, h-index: {}",
                i + 1,
                inst.display_name,
                inst.kind.as_deref().unwrap_or("Unknown"),
                inst.country_code.as_deref().unwrap_or("Unknown"),
                location,
                inst.works_count,
                inst.cited_by_count,
                inst.summary_stats.h_index,
            );
            if let Some(ror) = &inst.ror {
                entry.push_str(&format!("\n   ROR: {}", ror));
            }
            if let Some(homepage) = &inst.homepage_url {
                entry.push_str(&format!("\n   Homepage: {}", homepage));
            }
            entry.push_str(&format!("\n   ID: {}", inst.id));
            entry
        })
        .collect();
    header(page, "institutions") + &entries.join("\n\n")
}

pub fn institution(inst: &Institution) -> String {
    let mut out = format!("# {}\n\n", inst.display_name);
    if !inst.display_name_acronyms.is_empty() {
        out.push_str(&format!("**Acronyms:** {}\n", inst.display_name_acronyms.join(", ")));
    }
    if !inst.display_name_alternatives.is_empty() {
        out.push_str(&format!(
            "**Alternative names:** {}\n",
            inst.display_name_alternatives.join(", ")
        ));
    }
    out.push_str(&format!("**Type:** {}\n", or_na(inst.kind.as_deref())));
    out.push_str(&format!("**Country:** {}\n", or_na(inst.country_code.as_deref())));
    out.push_str(&format!("**ROR:** {}\n", or_na(inst.ror.as_deref())));
    if let Some(geo) = &inst.geo {
        if let (Some(lat), Some(lon)) = (geo.latitude, geo.longitude) {
            out.push_str(&format!("**Coordinates:** {:.4}, {:.4}\n", lat, lon));
        }
    }
    out.push_str(&format!("**OpenAlex ID:** {}\n\n", inst.id));

    out.push_str("## Metrics\n");
    out.push_str(&format!("- **Works:** {}\n", inst.works_count));
    out.push_str(&format!("- **Citations:** {}\n", inst.cited_by_count));
    out.push_str(&format!("- **h-index:** {}\n", inst.summary_stats.h_index));
    out.push_str(&format!("- **i10-index:** {}\n\n", inst.summary_stats.i10_index));

    if !inst.associated_institutions.is_empty() {
        out.push_str("## Associated Institutions\n");
        for assoc in &inst.associated_institutions {
            out.push_str(&format!(
                "- {} ({})\n",
                assoc.display_name,
                assoc.relationship.as_str()
            ));
        }
        out.push('\n');
    }

    if !inst.roles.is_empty() {
        out.push_str("## Roles\n");
        for role in &inst.roles {
            out.push_str(&format!("- {}: {} works\n", role.role, role.works_count));
        }
        out.push('\n');
    }

    if !inst.topics.is_empty() {
        out.push_str("## Research Topics\n");
        for topic in inst.topics.iter().take(MAX_TOPICS) {
            out.push_str(&format!("- {} ({} works)\n", topic.display_name, topic.count));
        }
        out.push('\n');
    }

    if let Some(homepage) = &inst.homepage_url {
        out.push_str(&format!("**Homepage:** {}\n", homepage));
    }
    out
}

// ── Sources ─────────────────────────────────────────────────────────────────

pub fn sources_page(page: &Page<Source>) -> String {
    let entries: Vec<String> = page
        .results
        .iter()
        .enumerate()
        .map(|(i, s)| source_entry(i + 1, s))
        .collect();
    header(page, "sources") + &entries.join("\n\n")
}

fn source_entry(n: usize, s: &Source) -> String {
    let mut entry = format!("{}. {}\n   Type: {}", n, s.display_name, s.kind.as_deref().unwrap_or("Unknown"));
    if let Some(publisher) = &s.host_organization_name {
        entry.push_str(&format!(", Publisher: {}", publisher));
    }
    entry.push_str(&format!(
        "\n   ISSN-L: {}, Country: {}\n   Open Access: {}, In DOAJ: {}",
        or_na(s.issn_l.as_deref()),
        s.country_code.as_deref().unwrap_or("Unknown"),
        yes_no(s.is_oa),
        yes_no(s.is_in_doaj),
    ));
    if let Some(apc) = s.apc_usd {
        entry.push_str(&format!(", APC: ${}", apc));
    }
    entry.push_str(&format!(
        "\n   Works: {}, Citations: {}, h-index: {}",
        s.works_count, s.cited_by_count, s.summary_stats.h_index
    ));
    if let Some(homepage) = &s.homepage_url {
        entry.push_str(&format!("\n   Homepage: {}", homepage));
    }
    entry.push_str(&format!("\n   ID: {}", s.id));
    entry
}

pub fn source(s: &Source) -> String {
    let mut out = format!("# {}\n\n", s.display_name);
    if let Some(abbrev) = &s.abbreviated_title {
        out.push_str(&format!("**Abbreviated title:** {}\n", abbrev));
    }
    if let Some(issn) = &s.issn {
        out.push_str(&format!("**ISSN:** {}\n", issn.join(", ")));
    }
    out.push_str(&format!("**Type:** {}\n", or_na(s.kind.as_deref())));
    out.push_str(&format!("**Publisher:** {}\n", or_na(s.host_organization_name.as_deref())));
    out.push_str(&format!("**Open Access:** {}\n", yes_no(s.is_oa)));
    out.push_str(&format!("**In DOAJ:** {}\n", yes_no(s.is_in_doaj)));
    if let Some(apc) = s.apc_usd {
        out.push_str(&format!("**APC (USD):** {}\n", apc));
    }
    out.push_str(&format!("**OpenAlex ID:** {}\n\n", s.id));

    out.push_str("## Metrics\n");
    out.push_str(&format!("- **Works:** {}\n", s.works_count));
    out.push_str(&format!("- **Citations:** {}\n", s.cited_by_count));
    out.push_str(&format!("- **h-index:** {}\n", s.summary_stats.h_index));
    out.push_str(&format!(
        "- **2-year mean citedness:** {:.2}\n",
        s.summary_stats.two_year_mean_citedness
    ));

    if !s.topics.is_empty() {
        out.push_str("\n## Topics\n");
        for topic in s.topics.iter().take(MAX_TOPICS) {
            out.push_str(&format!("- {} ({} works)\n", topic.display_name, topic.count));
        }
    }
    if let Some(homepage) = &s.homepage_url {
        out.push_str(&format!("\n**Homepage:** {}\n", homepage));
    }
    out
}
