//! Short natural-language suggestions about recent occurrences.
//!
//! The call to the text-generation service is decorative: it never fails
//! towards the caller. Missing credentials and every error path collapse into
//! one of the canned strings below.

use crate::model::{Occurrence, OccurrenceType};
use anyhow::{anyhow, Context};
use serde::Serialize;
use serde_json::json;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

pub const PENDING_TEXT: &str = "Analisando tendências escolares...";
pub const FALLBACK_NO_CREDENTIAL: &str =
    "Sugestões da IA indisponíveis: nenhuma chave de API configurada.";
pub const FALLBACK_NO_DATA: &str =
    "Nenhuma ocorrência registrada ainda. Continue acompanhando o clima escolar.";
pub const FALLBACK_ERROR: &str = "Erro ao gerar insights da IA.";

pub const MAX_DIGEST: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestEntry {
    #[serde(rename = "tipo")]
    pub kind: OccurrenceType,
    #[serde(rename = "motivo")]
    pub reason: String,
    #[serde(rename = "data")]
    pub date: String,
}

/// Most recent `size` occurrences (capped at `MAX_DIGEST`), reduced to
/// type, reason and date. Collections are stored newest first.
pub fn digest(occurrences: &[Occurrence], size: usize) -> Vec<DigestEntry> {
    occurrences
        .iter()
        .take(size.min(MAX_DIGEST))
        .map(|o| DigestEntry {
            kind: o.kind,
            reason: o.reason.clone(),
            date: o.date.clone(),
        })
        .collect()
}

pub fn prompt(entries: &[DigestEntry]) -> String {
    let data = serde_json::to_string(entries).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Analise brevemente estes dados de ocorrências escolares e dê uma sugestão de 2 linhas \
         para a direção pedagógica melhorar o clima escolar. Dados: {data}"
    )
}

pub trait InsightService: Send + Sync {
    fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(endpoint: &str, model: &str, api_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl InsightService for GeminiClient {
    fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .context("insight request failed")?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("insight service returned {}", status));
        }
        let value: serde_json::Value = resp.json().context("insight response is not JSON")?;
        response_text(&value).ok_or_else(|| anyhow!("insight response carried no text"))
    }
}

/// Concatenated text parts of the first candidate.
fn response_text(value: &serde_json::Value) -> Option<String> {
    let parts = value
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

pub fn summarize(
    service: Option<&dyn InsightService>,
    occurrences: &[Occurrence],
    size: usize,
) -> String {
    let Some(service) = service else {
        return FALLBACK_NO_CREDENTIAL.to_string();
    };
    let entries = digest(occurrences, size);
    if entries.is_empty() {
        return FALLBACK_NO_DATA.to_string();
    }
    run(service, &entries)
}

fn run(service: &dyn InsightService, entries: &[DigestEntry]) -> String {
    match service.generate(&prompt(entries)) {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            warn!("insight service returned empty text, using fallback");
            FALLBACK_ERROR.to_string()
        }
        Err(e) => {
            warn!(error = %format!("{e:#}"), "insight service failed, using fallback");
            FALLBACK_ERROR.to_string()
        }
    }
}

#[derive(Debug)]
struct InsightSlot {
    issued: u64,
    applied: u64,
    text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSnapshot {
    pub text: String,
    pub seq: u64,
    pub pending: bool,
}

/// Holds the single insight text shown on the dashboard. Requests run on a
/// detached thread; a result lands only if no newer request was issued in
/// the meantime.
pub struct InsightAdvisor {
    service: Option<Arc<dyn InsightService>>,
    digest_size: usize,
    slot: Arc<Mutex<InsightSlot>>,
}

fn apply(slot: &Mutex<InsightSlot>, seq: u64, text: String) -> bool {
    let mut s = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if seq != s.issued {
        debug!(seq, latest = s.issued, "discarding stale insight");
        return false;
    }
    s.text = text;
    s.applied = seq;
    true
}

impl InsightAdvisor {
    pub fn new(service: Option<Arc<dyn InsightService>>, digest_size: usize) -> Self {
        Self {
            service,
            digest_size,
            slot: Arc::new(Mutex::new(InsightSlot {
                issued: 0,
                applied: 0,
                text: PENDING_TEXT.to_string(),
            })),
        }
    }

    pub fn has_service(&self) -> bool {
        self.service.is_some()
    }

    fn issue(&self) -> u64 {
        let mut s = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        s.issued += 1;
        s.issued
    }

    /// Starts a new request and returns its sequence number. Degraded cases
    /// resolve before returning.
    pub fn request(&self, occurrences: &[Occurrence]) -> u64 {
        let seq = self.issue();
        let size = self.digest_size;
        let recent: Vec<Occurrence> = occurrences
            .iter()
            .take(size.min(MAX_DIGEST))
            .cloned()
            .collect();
        match self.service.clone() {
            Some(service) if !recent.is_empty() => {
                let slot = Arc::clone(&self.slot);
                std::thread::spawn(move || {
                    let text = summarize(Some(service.as_ref()), &recent, size);
                    apply(&slot, seq, text);
                });
            }
            service => {
                apply(&self.slot, seq, summarize(service.as_deref(), &recent, size));
            }
        }
        seq
    }

    pub fn snapshot(&self) -> InsightSnapshot {
        let s = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        InsightSnapshot {
            text: s.text.clone(),
            seq: s.applied,
            pending: s.applied < s.issued,
        }
    }
}
