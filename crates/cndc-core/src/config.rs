use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use cndc_parser::{FieldSpec, PeriodDecoder, DEFAULT_CENTURY_BASE};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

pub const DEFAULT_BASE_URL: &str = "https://www.cndc.bo/media/archivos/estadistica_mensual/";
pub const DEFAULT_RELEASE_PREFIX: &str = "c_iny_";
const MAX_CENTURY_BASE: i32 = 9900;

/// How a family's per-period values combine inside one group: energy and power
/// add up, prices average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    #[default]
    Sum,
    Mean,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layout {
    /// One column per metric and month, `"<metric label> <period token>"`.
    Wide { metric_fragment: String },
    /// One row per entity and month; the month sits in its own cell.
    PeriodColumn {
        period_field: FieldSpec,
        value_field: FieldSpec,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricFamily {
    pub value_name: String,
    pub layout: Layout,
    /// Identifier fields, in output column order.
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub aggregate: Aggregate,
}

impl MetricFamily {
    pub fn identifier_columns(&self) -> Vec<String> {
        self.fields.iter().map(|field| field.name.clone()).collect()
    }

    /// Every field that must resolve before a release can be reshaped.
    pub fn required_fields(&self) -> Vec<FieldSpec> {
        let mut fields = self.fields.clone();
        if let Layout::PeriodColumn {
            period_field,
            value_field,
        } = &self.layout
        {
            fields.push(period_field.clone());
            fields.push(value_field.clone());
        }
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_release_prefix")]
    pub prefix: String,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            prefix: default_release_prefix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Century added to two-digit years in `MMYY` period codes.
    #[serde(default = "default_century_base")]
    pub century_base: i32,
    /// Glob patterns for derived files that live next to the releases.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
    #[serde(default = "default_families")]
    pub families: BTreeMap<String, MetricFamily>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            century_base: default_century_base(),
            exclude: default_exclude(),
            acquisition: AcquisitionConfig::default(),
            families: default_families(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn decoder(&self) -> PeriodDecoder {
        PeriodDecoder::new(self.century_base)
    }

    pub fn family(&self, name: &str) -> Result<&MetricFamily> {
        self.families.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.families.keys().map(String::as_str).collect();
            PipelineError::Config(format!(
                "unknown family '{name}' (configured: {})",
                known.join(", ")
            ))
        })
    }

    fn validate(&self) -> Result<()> {
        if !(0..=MAX_CENTURY_BASE).contains(&self.century_base) {
            return Err(PipelineError::Config(format!(
                "century_base {} outside 0..={MAX_CENTURY_BASE}",
                self.century_base
            )));
        }
        for (name, family) in &self.families {
            if family.fields.is_empty() {
                return Err(PipelineError::Config(format!(
                    "family '{name}' has no identifier fields"
                )));
            }
            for field in family.required_fields() {
                if field.aliases.is_empty() {
                    return Err(PipelineError::Config(format!(
                        "family '{name}' field '{}' has no aliases",
                        field.name
                    )));
                }
            }
            if let Layout::Wide { metric_fragment } = &family.layout {
                if metric_fragment.trim().is_empty() {
                    return Err(PipelineError::Config(format!(
                        "family '{name}' has an empty metric_fragment"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn default_century_base() -> i32 {
    DEFAULT_CENTURY_BASE
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_release_prefix() -> String {
    DEFAULT_RELEASE_PREFIX.to_string()
}

fn default_exclude() -> Vec<String> {
    ["extracted_*", "serie_*", "*_empresas_*"]
        .iter()
        .map(|pattern| pattern.to_string())
        .collect()
}

const TECHNOLOGY_ALIASES: &[&str] = &["TECNOLOGÍA", "TECNOLOGIA", "TIPO", "TEC"];

fn wide(
    value_name: &str,
    fragment: &str,
    fields: Vec<FieldSpec>,
    aggregate: Aggregate,
) -> MetricFamily {
    MetricFamily {
        value_name: value_name.to_string(),
        layout: Layout::Wide {
            metric_fragment: fragment.to_string(),
        },
        fields,
        aggregate,
    }
}

/// The dashboards of the monthly statistics site, one family each.
pub fn default_families() -> BTreeMap<String, MetricFamily> {
    let by_generator = || vec![FieldSpec::exact("CENTRAL"), FieldSpec::exact("GENERADOR")];
    let by_technology = || {
        vec![
            FieldSpec::exact("CENTRAL"),
            FieldSpec::new("TECNOLOGIA", TECHNOLOGY_ALIASES),
        ]
    };

    let mut families = BTreeMap::new();
    families.insert(
        "energia_generador".to_string(),
        wide("Energía kWh", "Energía kWh", by_generator(), Aggregate::Sum),
    );
    families.insert(
        "energia_tecnologia".to_string(),
        wide("Energía kWh", "Energía kWh", by_technology(), Aggregate::Sum),
    );
    families.insert(
        "potencia_generador".to_string(),
        wide("Potencia kW", "Potencia kW", by_generator(), Aggregate::Sum),
    );
    families.insert(
        "potencia_tecnologia".to_string(),
        wide("Potencia kW", "Potencia kW", by_technology(), Aggregate::Sum),
    );
    families.insert(
        "precio_potencia".to_string(),
        wide(
            "Precio Potencia USD/kW",
            "Precio Potencia USD/kW",
            vec![FieldSpec::exact("AGENTE"), FieldSpec::exact("EMPRESA")],
            Aggregate::Mean,
        ),
    );
    families.insert(
        "precio_monomico".to_string(),
        MetricFamily {
            value_name: "Precio Monómico USD/MWh".to_string(),
            layout: Layout::PeriodColumn {
                period_field: FieldSpec::new("MES", &["MES", "MONTH", "PERIODO"]),
                value_field: FieldSpec::new(
                    "PRECIO_MONOMICO",
                    &["PRECIO_MONOMICO", "PRECIO", "PRICE"],
                ),
            },
            fields: vec![
                FieldSpec::new("AGENTE", &["AGENTE", "AGENT"]),
                FieldSpec::new("EMPRESA", &["EMPRESA", "COMPANY"]),
            ],
            aggregate: Aggregate::Mean,
        },
    );
    families
}
