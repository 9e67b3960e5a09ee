//! Sex- and region-keyed SCORE2 coefficient sets.
//!
//! The repository starts from built-in seed values and can be replaced
//! wholesale from a JSON document shaped like:
//!
//! ```json
//! { "Male": { "Moderate": { "Coefficients": [...], "S0": [...], "MeanLP": [...] } } }
//! ```
//!
//! A repository created with [`CoefficientRepository::from_path`] reads its file
//! lazily on first use. `OnceCell` guarantees a single load under concurrent
//! first use; later reads go straight to the initialized store.

use crate::{Error, Region, Result, Sex};
use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// One coefficient set; the per-age-group arrays are indexed by [`age_group_index`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoefficientSet {
    #[serde(rename = "Coefficients", default)]
    pub coefficients: Vec<f64>,
    #[serde(rename = "S0", default)]
    pub s0: Vec<f64>,
    #[serde(rename = "MeanLP", default)]
    pub mean_lp: Vec<f64>,
}

impl CoefficientSet {
    /// Baseline survival for the age group containing `age`
    pub fn s0_for_age(&self, age: u32) -> Option<f64> {
        self.s0.get(age_group_index(age)).copied()
    }

    /// Mean linear predictor for the age group containing `age`
    pub fn mean_lp_for_age(&self, age: u32) -> Option<f64> {
        self.mean_lp.get(age_group_index(age)).copied()
    }
}

/// 40–49 → 0, 50–59 → 1, everything else → 2
pub fn age_group_index(age: u32) -> usize {
    match age {
        40..=49 => 0,
        50..=59 => 1,
        _ => 2,
    }
}

/// Parsed store: sex → region → set
pub type CoefficientStore = BTreeMap<Sex, BTreeMap<Region, CoefficientSet>>;

/// Outcome of a JSON load
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The whole store was replaced by this many sets
    Replaced(usize),
    /// Nothing changed
    Ignored,
}

static SEEDED_STORE: Lazy<CoefficientStore> = Lazy::new(build_seeded_store);

/// Built-in seed values for Male/Female × {Moderate, High}
fn build_seeded_store() -> CoefficientStore {
    let set = |coefficients: [f64; 5], s0: [f64; 3], mean_lp: [f64; 3]| CoefficientSet {
        coefficients: coefficients.to_vec(),
        s0: s0.to_vec(),
        mean_lp: mean_lp.to_vec(),
    };

    let mut male = BTreeMap::new();
    male.insert(
        Region::Moderate,
        set(
            [-12.335, 3.952, 2.293, 1.264, 0.426],
            [0.9932, 0.9875, 0.9763],
            [-0.432, -0.214, -0.089],
        ),
    );
    male.insert(
        Region::High,
        set(
            [-11.945, 3.912, 2.201, 1.240, 0.410],
            [0.9910, 0.9851, 0.9730],
            [-0.450, -0.230, -0.100],
        ),
    );

    let mut female = BTreeMap::new();
    female.insert(
        Region::Moderate,
        set(
            [-13.112, 4.102, 2.021, 1.198, 0.360],
            [0.9950, 0.9902, 0.9801],
            [-0.512, -0.260, -0.120],
        ),
    );
    female.insert(
        Region::High,
        set(
            [-12.701, 4.060, 1.950, 1.180, 0.350],
            [0.9935, 0.9890, 0.9780],
            [-0.530, -0.280, -0.130],
        ),
    );

    let mut store = BTreeMap::new();
    store.insert(Sex::Male, male);
    store.insert(Sex::Female, female);
    store
}

/// Parse a coefficient document into a complete store
///
/// Sex and region keys are matched case-insensitively. Any unknown or
/// duplicate key, non-numeric entry or S0 outside (0, 1) rejects the whole
/// document.
pub fn parse_store(json: &str) -> Result<CoefficientStore> {
    let raw: HashMap<String, HashMap<String, CoefficientSet>> = serde_json::from_str(json)?;

    let mut store = CoefficientStore::new();
    for (sex_key, regions) in raw {
        let sex: Sex = sex_key.parse().map_err(Error::Coefficients)?;
        if store.contains_key(&sex) {
            return Err(Error::Coefficients(format!("duplicate sex key '{}'", sex_key)));
        }
        let entry = store.entry(sex).or_default();

        for (region_key, set) in regions {
            let region: Region = region_key.parse().map_err(Error::Coefficients)?;
            if entry.contains_key(&region) {
                return Err(Error::Coefficients(format!(
                    "{}: duplicate region key '{}'",
                    sex, region_key
                )));
            }

            if let Some(bad) = set.s0.iter().find(|s| !(**s > 0.0 && **s < 1.0)) {
                return Err(Error::Coefficients(format!(
                    "{}/{}: baseline survival {} is outside (0, 1)",
                    sex, region, bad
                )));
            }
            if set.coefficients.iter().chain(&set.mean_lp).any(|v| !v.is_finite()) {
                return Err(Error::Coefficients(format!(
                    "{}/{}: non-finite coefficient",
                    sex, region
                )));
            }

            entry.insert(region, set);
        }
    }

    Ok(store)
}

/// Owner of the coefficient store, created at the composition root and
/// passed by reference into the calculator
#[derive(Debug)]
pub struct CoefficientRepository {
    source: Option<PathBuf>,
    store: OnceCell<CoefficientStore>,
}

impl Default for CoefficientRepository {
    fn default() -> Self {
        Self::seeded()
    }
}

impl CoefficientRepository {
    /// Repository holding only the built-in seed values
    pub fn seeded() -> Self {
        Self {
            source: None,
            store: OnceCell::with_value((*SEEDED_STORE).clone()),
        }
    }

    /// Repository that loads `path` on first use, keeping the seeds if the
    /// file is absent or malformed
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(path.into()),
            store: OnceCell::new(),
        }
    }

    fn store(&self) -> &CoefficientStore {
        self.store.get_or_init(|| match &self.source {
            Some(path) => read_store_or_seeds(path),
            None => (*SEEDED_STORE).clone(),
        })
    }

    /// Replace the whole store from a JSON document
    ///
    /// All or nothing: a parse error or an empty document leaves the current
    /// store untouched and is only reported through logging.
    pub fn load_json(&mut self, json: &str) -> LoadOutcome {
        if json.trim().is_empty() {
            return LoadOutcome::Ignored;
        }

        match parse_store(json) {
            Ok(store) => {
                let count: usize = store.values().map(BTreeMap::len).sum();
                if count == 0 {
                    tracing::warn!("Coefficient document has no entries, keeping current store");
                    return LoadOutcome::Ignored;
                }
                tracing::info!("Loaded {} coefficient sets", count);
                self.store = OnceCell::with_value(store);
                LoadOutcome::Replaced(count)
            }
            Err(e) => {
                tracing::warn!("Ignoring coefficient document: {}", e);
                LoadOutcome::Ignored
            }
        }
    }

    /// Coefficient set for `sex` in `region`
    ///
    /// A region the store lacks resolves to Moderate, then to the first
    /// region held for `sex`. Seed values are used only when the current
    /// store has nothing for `sex`.
    pub fn get(&self, sex: Sex, region: Region) -> &CoefficientSet {
        find(self.store(), sex, region)
            .or_else(|| find(&SEEDED_STORE, sex, region))
            .unwrap_or_else(|| &SEEDED_STORE[&Sex::Male][&Region::Moderate])
    }

    /// Regions the current store holds for `sex`
    pub fn available_regions(&self, sex: Sex) -> Vec<Region> {
        self.store()
            .get(&sex)
            .map(|regions| regions.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Short description of the store contents, e.g. `Male:Moderate,High;Female:Moderate,High`
    pub fn data_version(&self) -> String {
        self.store()
            .iter()
            .map(|(sex, regions)| {
                let keys: Vec<String> = regions.keys().map(Region::to_string).collect();
                format!("{}:{}", sex, keys.join(","))
            })
            .collect::<Vec<_>>()
            .join(";")
    }
}

fn find(store: &CoefficientStore, sex: Sex, region: Region) -> Option<&CoefficientSet> {
    let regions = store.get(&sex)?;
    regions
        .get(&region)
        .or_else(|| regions.get(&Region::Moderate))
        .or_else(|| regions.values().next())
}

#[cfg(test)]
static FILE_READS: Lazy<std::sync::Mutex<HashMap<PathBuf, usize>>> = Lazy::new(Default::default);

fn read_store_or_seeds(path: &Path) -> CoefficientStore {
    #[cfg(test)]
    if let Ok(mut reads) = FILE_READS.lock() {
        *reads.entry(path.to_path_buf()).or_default() += 1;
    }

    if !path.exists() {
        tracing::debug!("No coefficient file at {:?}, using seeded values", path);
        return (*SEEDED_STORE).clone();
    }

    let parsed = std::fs::read_to_string(path)
        .map_err(Error::from)
        .and_then(|contents| parse_store(&contents));

    match parsed {
        Ok(store) if !store.is_empty() => {
            tracing::info!("Loaded coefficients from {:?}", path);
            store
        }
        Ok(_) => {
            tracing::warn!("Coefficient file {:?} is empty, using seeded values", path);
            (*SEEDED_STORE).clone()
        }
        Err(e) => {
            tracing::warn!(
                "Failed to load coefficients from {:?}: {}. Using seeded values.",
                path,
                e
            );
            (*SEEDED_STORE).clone()
        }
    }
}
