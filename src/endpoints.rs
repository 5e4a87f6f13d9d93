// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! GMA service endpoints
//!
//! Thin wrappers that turn arguments into an endpoint and body and hand
//! them to [`GmaClient::execute`]. `Ok(None)` means the resource is absent.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::client::GmaClient;
use crate::error::Result;
use crate::session::{ApiCall, Payload};

const SERVICES: &str = "?q=gmaservices";

/// Which staff reports a search covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportScope {
    /// Reports owned by the signed-in user
    #[default]
    Own,
    /// Every report the user may see
    All,
}

impl ReportScope {
    fn search_endpoint(self) -> String {
        match self {
            ReportScope::Own => format!("{}/gma_staffReport/searchOwn", SERVICES),
            ReportScope::All => format!("{}/gma_staffReport/searchAll", SERVICES),
        }
    }
}

/// Filters for a staff report search
#[derive(Debug, Clone, Default)]
pub struct StaffReportQuery {
    pub scope: ReportScope,
    pub node_ids: Vec<i64>,
    pub date_within: Option<NaiveDate>,
    pub submitted: Option<bool>,
    /// Only honoured for [`ReportScope::All`]
    pub ren_id: Option<i64>,
}

impl StaffReportQuery {
    pub fn own() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            scope: ReportScope::All,
            ..Default::default()
        }
    }

    pub fn node(mut self, node_id: i64) -> Self {
        self.node_ids.push(node_id);
        self
    }

    pub fn nodes(mut self, node_ids: impl IntoIterator<Item = i64>) -> Self {
        self.node_ids.extend(node_ids);
        self
    }

    pub fn date_within(mut self, date: NaiveDate) -> Self {
        self.date_within = Some(date);
        self
    }

    pub fn submitted(mut self, submitted: bool) -> Self {
        self.submitted = Some(submitted);
        self
    }

    pub fn ren_id(mut self, ren_id: i64) -> Self {
        self.ren_id = Some(ren_id);
        self
    }

    fn body(&self) -> StaffReportSearch {
        StaffReportSearch {
            max_result: 0,
            node_id: (!self.node_ids.is_empty()).then(|| self.node_ids.clone()),
            date_within: self.date_within.map(|d| d.format("%Y%m%d").to_string()),
            submitted: self.submitted,
            ren_id: match self.scope {
                ReportScope::All => self.ren_id,
                ReportScope::Own => None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StaffReportSearch {
    max_result: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    node_id: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_within: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    submitted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ren_id: Option<i64>,
}

/// How the service should store a measurement value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementType {
    Numeric,
    Text,
}

impl MeasurementType {
    /// `Numeric` for numbers and numeric-looking strings, `Text` otherwise
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Number(_) => MeasurementType::Numeric,
            Value::String(s) if is_numeric(s) => MeasurementType::Numeric,
            _ => MeasurementType::Text,
        }
    }
}

/// One entry of a staff report measurement update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub measurement_id: i64,
    #[serde(rename = "type")]
    pub kind: MeasurementType,
    pub value: Value,
}

impl Measurement {
    pub fn new(measurement_id: i64, value: impl Into<Value>) -> Self {
        let value = value.into();
        Self {
            measurement_id,
            kind: MeasurementType::of(&value),
            value,
        }
    }
}

/// Lexical number check: optional surrounding whitespace, sign, digits with
/// at most one decimal point, optional exponent.
pub fn is_numeric(s: &str) -> bool {
    let s = s.trim();
    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };

    let mut parts = mantissa.splitn(2, '.');
    let int_part = parts.next().unwrap_or_default();
    let frac_part = parts.next();
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());

    let mantissa_ok = match frac_part {
        Some(frac) => {
            all_digits(int_part) && all_digits(frac) && !(int_part.is_empty() && frac.is_empty())
        }
        None => !int_part.is_empty() && all_digits(int_part),
    };
    let exponent_ok = exponent.map_or(true, |e| {
        let e = e.strip_prefix(['+', '-']).unwrap_or(e);
        !e.is_empty() && all_digits(e)
    });

    mantissa_ok && exponent_ok
}

impl GmaClient {
    async fn fetch(&mut self, call: ApiCall) -> Result<Option<Value>> {
        Ok(self.execute(call).await?.into_option())
    }

    pub async fn get_languages(&mut self) -> Result<Option<Value>> {
        self.fetch(ApiCall::get(format!("{}/gma_language", SERVICES)))
            .await
    }

    pub async fn get_nodes(&mut self) -> Result<Option<Value>> {
        self.fetch(ApiCall::get(format!("{}/gma_node", SERVICES)))
            .await
    }

    pub async fn get_node(&mut self, id: i64) -> Result<Option<Value>> {
        self.fetch(ApiCall::get(format!("{}/gma_node/{}", SERVICES, id)))
            .await
    }

    pub async fn get_node_measurements(&mut self, id: i64) -> Result<Option<Value>> {
        self.fetch(ApiCall::get(format!("{}/gma_node/{}/measurements", SERVICES, id)))
            .await
    }

    pub async fn get_node_parent(&mut self, id: i64) -> Result<Option<Value>> {
        self.fetch(ApiCall::get(format!("{}/gma_node/{}/parent", SERVICES, id)))
            .await
    }

    /// List users of the given type (`active` when `None`)
    pub async fn get_users(&mut self, kind: Option<&str>) -> Result<Option<Value>> {
        let kind = kind.unwrap_or("active");
        self.fetch(ApiCall::get(format!("{}/gma_user&type={}", SERVICES, kind)))
            .await
    }

    pub async fn get_staff_report_measurements(&mut self, id: i64) -> Result<Option<Value>> {
        self.fetch(ApiCall::get(format!("{}/gma_staffReport/{}", SERVICES, id)))
            .await
    }

    pub async fn get_staff_reports(&mut self, query: &StaffReportQuery) -> Result<Option<Value>> {
        let body = Payload::json(&query.body())?;
        self.fetch(ApiCall::post(query.scope.search_endpoint(), body))
            .await
    }

    pub async fn set_staff_report_measurements(
        &mut self,
        id: i64,
        measurements: impl IntoIterator<Item = Measurement>,
    ) -> Result<Option<Value>> {
        let measurements: Vec<Measurement> = measurements.into_iter().collect();
        let body = Payload::json(&measurements)?;
        self.fetch(ApiCall::put(format!("{}/gma_staffReport/{}", SERVICES, id), body))
            .await
    }
}
