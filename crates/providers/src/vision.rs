//! Vision/OCR collaborator.
//!
//! Two calls are used by the capture flow: a combined product + price
//! tag analysis of the photographed shelf item, and a price-tag-only
//! re-analysis when the user reshoots just the tag. The live
//! implementation posts inline image data to a Gemini-style
//! `generateContent` REST endpoint with a JSON response schema, so the
//! model's reply parses directly into the structs below.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ProviderError;
use crate::with_retry;

// ---------------------------------------------------------------------------
// Analysis result types
// ---------------------------------------------------------------------------

/// Identity of the photographed product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductIdentity {
    pub name: String,
    #[serde(rename = "nameEnglish")]
    pub name_english: String,
    /// The name used as the domestic search query.
    #[serde(rename = "nameKorean")]
    pub name_korean: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Price tag fields extracted from the image, when one was visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTag {
    pub detected: bool,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(rename = "currencySymbol", default)]
    pub currency_symbol: Option<String>,
    #[serde(rename = "rawText", default)]
    pub raw_text: Option<String>,
}

/// Combined product + price tag analysis. Transient: held only for the
/// duration of one capture session, never persisted directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAnalysis {
    pub product: ProductIdentity,
    #[serde(rename = "priceTag")]
    pub price_tag: PriceTag,
    /// Model confidence in [0, 1].
    pub confidence: f64,
}

/// Price-tag-only OCR result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTagInfo {
    pub price: f64,
    pub currency: String,
    #[serde(rename = "currencySymbol")]
    pub currency_symbol: String,
    #[serde(rename = "rawText")]
    pub raw_text: String,
    pub confidence: f64,
}

/// Vision collaborator seam.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Combined product identification + price tag extraction.
    async fn analyze_product_with_price(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<ProductAnalysis, ProviderError>;

    /// Price-tag-only OCR re-analysis.
    async fn analyze_price_tag(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<PriceTagInfo, ProviderError>;
}

// ---------------------------------------------------------------------------
// Gemini implementation
// ---------------------------------------------------------------------------

const GEMINI_MODEL: &str = "gemini-2.5-flash";

const PRODUCT_WITH_PRICE_PROMPT: &str = "You are a product recognition expert for a travel \
price-comparison app. Identify the product in this image (name, English name, Korean name \
suitable as a Korean shopping search query, brand if visible) AND extract the price tag if one \
is visible (numeric price, ISO 4217 currency code, currency symbol, raw tag text). Set \
confidence below 0.5 when unsure.";

const PRICE_TAG_PROMPT: &str = "Extract the price from this price tag photo: numeric price, \
ISO 4217 currency code, currency symbol, and the raw text on the tag.";

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

/// Vision client backed by the Gemini `generateContent` REST API.
pub struct GeminiVision {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiVision {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
        }
    }

    /// Read `GEMINI_API_KEY` from the environment.
    pub fn from_env(client: reqwest::Client) -> Result<Self, ProviderError> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            ProviderError::Credentials { provider: "gemini", detail: "GEMINI_API_KEY not set" }
        })?;
        Ok(Self::new(client, api_key))
    }

    /// Override the endpoint, for tests against a local server.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// POST one generateContent request and return the model's text
    /// reply (the JSON document, thanks to the response schema).
    async fn generate(
        &self,
        image: &[u8],
        mime_type: &str,
        system_prompt: &str,
        response_schema: serde_json::Value,
        user_text: &str,
    ) -> Result<String, ProviderError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let body = json!({
            "systemInstruction": { "parts": [{ "text": system_prompt }] },
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": mime_type, "data": encoded } },
                    { "text": user_text }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema,
            }
        });

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, GEMINI_MODEL, self.api_key
        );

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { provider: "gemini", status: status.as_u16(), body });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ProviderError::Malformed {
                provider: "gemini",
                detail: "empty model response".into(),
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl VisionAnalyzer for GeminiVision {
    async fn analyze_product_with_price(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<ProductAnalysis, ProviderError> {
        let schema = json!({
            "type": "object",
            "properties": {
                "product": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "nameEnglish": { "type": "string" },
                        "nameKorean": { "type": "string" },
                        "brand": { "type": ["string", "null"] },
                        "description": { "type": ["string", "null"] },
                    },
                    "required": ["name", "nameEnglish", "nameKorean"],
                },
                "priceTag": {
                    "type": "object",
                    "properties": {
                        "detected": { "type": "boolean" },
                        "price": { "type": ["number", "null"] },
                        "currency": { "type": ["string", "null"] },
                        "currencySymbol": { "type": ["string", "null"] },
                        "rawText": { "type": ["string", "null"] },
                    },
                    "required": ["detected"],
                },
                "confidence": { "type": "number" },
            },
            "required": ["product", "priceTag", "confidence"],
        });

        let text = with_retry(|| {
            self.generate(
                image,
                mime_type,
                PRODUCT_WITH_PRICE_PROMPT,
                schema.clone(),
                "Analyze this image and extract BOTH product information AND price tag \
                 information if visible.",
            )
        })
        .await?;

        serde_json::from_str(&text).map_err(|e| ProviderError::Malformed {
            provider: "gemini",
            detail: format!("analysis JSON did not match schema: {e}"),
        })
    }

    async fn analyze_price_tag(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<PriceTagInfo, ProviderError> {
        let schema = json!({
            "type": "object",
            "properties": {
                "price": { "type": "number" },
                "currency": { "type": "string" },
                "currencySymbol": { "type": "string" },
                "rawText": { "type": "string" },
                "confidence": { "type": "number" },
            },
            "required": ["price", "currency", "currencySymbol", "rawText", "confidence"],
        });

        let text = with_retry(|| {
            self.generate(
                image,
                mime_type,
                PRICE_TAG_PROMPT,
                schema.clone(),
                "Extract the price information from this price tag.",
            )
        })
        .await?;

        serde_json::from_str(&text).map_err(|e| ProviderError::Malformed {
            provider: "gemini",
            detail: format!("price tag JSON did not match schema: {e}"),
        })
    }
}
