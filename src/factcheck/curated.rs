//! In-memory catalog of well-known, already debunked or confirmed claims

use super::models::{SourceCandidate, SourceError};
use super::source::FactCheckSource;
use crate::claims::FactCheckVerdict;
use crate::text::content_terms;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratedEntry {
    pub claim: String,
    pub verdict: FactCheckVerdict,
    pub url: String,
    pub publisher: String,
    pub rating: String,
    pub credibility: f64,
}

impl CuratedEntry {
    fn new(
        claim: &str,
        verdict: FactCheckVerdict,
        rating: &str,
        publisher: &str,
        credibility: f64,
        url: &str,
    ) -> Self {
        Self {
            claim: claim.to_string(),
            verdict,
            url: url.to_string(),
            publisher: publisher.to_string(),
            rating: rating.to_string(),
            credibility,
        }
    }
}

/// Built-in catalog entries
pub fn default_catalog() -> Vec<CuratedEntry> {
    use FactCheckVerdict::{False, True};

    vec![
        CuratedEntry::new(
            "Drinking bleach cures COVID-19",
            False,
            "False",
            "U.S. Food and Drug Administration",
            0.95,
            "https://www.fda.gov/news-events/press-announcements/coronavirus-covid-19-update-fda-warns-seller-marketing-dangerous-chlorine-dioxide-products-claim-treat-or",
        ),
        CuratedEntry::new(
            "The Earth is flat",
            False,
            "False",
            "Reuters Fact Check",
            0.95,
            "https://www.reuters.com/fact-check/earth-is-round",
        ),
        CuratedEntry::new(
            "Chemtrails from airplanes spray chemicals on the population",
            False,
            "False",
            "Snopes",
            0.9,
            "https://www.snopes.com/fact-check/chemtrails/",
        ),
        CuratedEntry::new(
            "The moon landing was faked and staged",
            False,
            "False",
            "AP Fact Check",
            0.95,
            "https://apnews.com/article/fact-check-moon-landing-not-fake-apollo-5c6bc1ffe2f888c2b4b6768c0a4858f1",
        ),
        CuratedEntry::new(
            "Natural cures and essential oils cure cancer",
            False,
            "False",
            "Science-Based Medicine",
            0.85,
            "https://sciencebasedmedicine.org/alternative-medicine/",
        ),
        CuratedEntry::new(
            "Vaccines contain microchips for tracking people",
            False,
            "False",
            "FactCheck.org",
            0.9,
            "https://www.factcheck.org/2021/03/scicheck-microchips-in-vaccines/",
        ),
        CuratedEntry::new(
            "5G networks cause or spread coronavirus",
            False,
            "False",
            "Full Fact",
            0.9,
            "https://fullfact.org/health/5G-not-cause-coronavirus/",
        ),
        CuratedEntry::new(
            "Climate change is a hoax",
            False,
            "False",
            "NASA Climate",
            0.95,
            "https://climate.nasa.gov/evidence/",
        ),
        CuratedEntry::new(
            "The election was stolen through widespread voter fraud",
            False,
            "False",
            "PolitiFact",
            0.9,
            "https://www.politifact.com/article/2022/nov/09/allegations-voter-fraud-dont-last/",
        ),
        CuratedEntry::new(
            "Climate change is driven by human carbon emissions",
            True,
            "Fact-Based",
            "FactCheck.org",
            0.9,
            "https://www.factcheck.org/issue/climate-change/",
        ),
        CuratedEntry::new(
            "COVID-19 vaccines are safe and effective",
            True,
            "Fact-Based",
            "Reuters Fact Check",
            0.95,
            "https://www.reuters.com/fact-check/health-coronavirus",
        ),
    ]
}

/// Fact-check source answering from a fixed catalog
pub struct CuratedCatalogSource {
    name: String,
    credibility: f64,
    entries: Vec<(CuratedEntry, BTreeSet<String>)>,
}

impl CuratedCatalogSource {
    pub fn new(name: impl Into<String>, credibility: f64, entries: Vec<CuratedEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| {
                let terms = content_terms(&entry.claim);
                (entry, terms)
            })
            .collect();

        Self {
            name: name.into(),
            credibility,
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CuratedCatalogSource {
    fn default() -> Self {
        Self::new("curated", 0.9, default_catalog())
    }
}

#[async_trait]
impl FactCheckSource for CuratedCatalogSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn credibility(&self) -> f64 {
        self.credibility
    }

    /// Entries sharing at least one content term; the retriever applies the similarity cut
    async fn search(&self, claim_text: &str) -> Result<Vec<SourceCandidate>, SourceError> {
        let terms = content_terms(claim_text);

        Ok(self
            .entries
            .iter()
            .filter(|(_, entry_terms)| !entry_terms.is_disjoint(&terms))
            .map(|(entry, _)| {
                SourceCandidate::new(entry.claim.clone(), entry.verdict, entry.url.clone())
                    .with_credibility(entry.credibility)
                    .with_publisher(entry.publisher.clone())
                    .with_rating(entry.rating.clone())
            })
            .collect())
    }
}
