//! Client for the generative text service behind the advisory tools.
//!
//! Shapes one request per tool (a Portuguese instruction, plus a structured
//! response schema for the dictionary and rhyme lookups), validates replies
//! defensively at the boundary and picks each tool's degraded answer on
//! failure. The service's own behavior is out of scope here; callers never
//! see a raw protocol error.

use super::cache::{self, QueryCache};
use super::{DictionaryEntry, LiteraryReference, RhymeSheet, offline};
use crate::config::AppConfig;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::env;
use tracing::{debug, info, warn};

/// Keys left at this placeholder count as unconfigured.
pub const PLACEHOLDER_API_KEY: &str = "PLACEHOLDER_API_KEY";

const MSG_KEY_MISSING: &str =
    "⚠️ Erro: Chave de API não configurada (defina a variável de ambiente API_KEY).";
const MSG_CONTINUATION_KEY_MISSING: &str =
    "⚠️ O Sopro Criativo precisa que uma Chave de API válida seja configurada.";
const MSG_DICTIONARY_UNAVAILABLE: &str =
    "Serviço de consulta indisponível no momento. Verifique sua conexão.";
const MSG_REVIEW_AUTH: &str = "⚠️ Erro de Autenticação: Verifique sua API Key.";
const MSG_REVIEW_UNAVAILABLE: &str =
    "Serviço de revisão indisponível no momento. Verifique sua conexão.";
const MSG_CONTINUATION_EMPTY: &str = "O autor silenciou... (tente novamente)";
const MSG_CONTINUATION_UNAVAILABLE: &str =
    "Não foi possível invocar a inspiração agora. (Erro de Conexão ou API)";
const MSG_LITERARY_AUTH: &str = "Erro de Permissão/API Key. Verifique sua configuração.";
const MSG_LITERARY_GENERIC: &str = "Ocorreu um erro ao buscar informações.";

#[derive(serde::Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolSpec>>,
}

#[derive(serde::Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(serde::Serialize)]
struct Part {
    text: String,
}

#[derive(serde::Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(serde::Serialize)]
struct ToolSpec {
    #[serde(rename = "googleSearch")]
    google_search: serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

pub struct Assistant {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    cache: QueryCache,
}

impl Assistant {
    pub fn new(config: &AppConfig) -> Self {
        let api_key = env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.is_empty() && key != PLACEHOLDER_API_KEY);
        if api_key.is_none() {
            info!(
                var = %config.api_key_env,
                "Assistant key not configured; tools will use their offline paths"
            );
        }
        Assistant {
            client: reqwest::blocking::Client::new(),
            base_url: config.assistant_base_url.clone(),
            model: config.assistant_model.clone(),
            api_key,
            cache: QueryCache::new(config.cache_dir.clone()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Dictionary lookup. Cached; failure degrades to a static notice.
    pub fn define(&self, word: &str) -> Result<DictionaryEntry, String> {
        let key = cache::dictionary_key(word);
        if let Some(entry) = self.cache.load::<DictionaryEntry>(&key) {
            return Ok(entry);
        }
        if !self.is_configured() {
            return Err(MSG_KEY_MISSING.to_string());
        }

        let prompt = format!(
            "Forneça a definição, etimologia, sinônimos e antônimos da palavra \"{word}\" em \
             português brasileiro. Se a palavra não existir ou estiver escrita incorretamente, \
             sugira correções ortográficas ou palavras parecidas no campo \"didYouMean\" e deixe \
             a definição vazia."
        );
        let request = GenerateRequest {
            contents: prompt_contents(prompt),
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: Some(dictionary_schema()),
            }),
            system_instruction: None,
            tools: None,
        };

        match self
            .generate(&request)
            .and_then(|text| parse_json_payload::<DictionaryEntry>(&text))
        {
            Ok(entry) => {
                self.cache.store(&key, &entry);
                Ok(entry)
            }
            Err(err) => {
                warn!(%word, "Dictionary lookup failed: {err}");
                Err(MSG_DICTIONARY_UNAVAILABLE.to_string())
            }
        }
    }

    /// Rhyme lookup. Cached; unconfigured or failed requests fall back to the
    /// offline suffix table, so this always produces a sheet.
    pub fn rhymes(&self, word: &str) -> RhymeSheet {
        if !self.is_configured() {
            return offline::rhymes(word);
        }
        let key = cache::rhyme_key(word);
        if let Some(sheet) = self.cache.load::<RhymeSheet>(&key) {
            return sheet;
        }

        let prompt = format!(
            "Liste rimas para a palavra \"{word}\" em português. Classifique por tipo \
             (consonante/toante), número de sílabas e tonicidade."
        );
        let request = GenerateRequest {
            contents: prompt_contents(prompt),
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: Some(rhyme_schema()),
            }),
            system_instruction: None,
            tools: None,
        };

        match self
            .generate(&request)
            .and_then(|text| parse_json_payload::<RhymeSheet>(&text))
        {
            Ok(sheet) => {
                self.cache.store(&key, &sheet);
                sheet
            }
            Err(err) => {
                warn!(%word, "Rhyme lookup failed; using offline fallback: {err}");
                offline::rhymes(word)
            }
        }
    }

    /// Literary reference lookup. A curated local entry intercepts its
    /// subject; otherwise cached, tried first with web search and retried
    /// without, and degraded to a placeholder reference on final failure.
    pub fn literary_reference(&self, query: &str) -> LiteraryReference {
        if let Some(reference) = curated_reference(query) {
            info!(%query, "Answered literary lookup from the curated shelf");
            return reference;
        }
        let key = cache::literary_key(query);
        if let Some(reference) = self.cache.load::<LiteraryReference>(&key) {
            return reference;
        }
        if !self.is_configured() {
            return degraded_reference(MSG_KEY_MISSING);
        }

        let outcome = self.literary_request(query, true).or_else(|err| {
            warn!(%query, "Reference lookup with web search failed; retrying without: {err}");
            self.literary_request(query, false)
        });
        match outcome {
            Ok(reference) => {
                self.cache.store(&key, &reference);
                reference
            }
            Err(err) => {
                warn!(%query, "Reference lookup failed: {err}");
                let message = if is_auth_error(&err) {
                    MSG_LITERARY_AUTH
                } else {
                    MSG_LITERARY_GENERIC
                };
                degraded_reference(message)
            }
        }
    }

    /// Editorial advisory over the whole text. Free-form reply; the degraded
    /// notices double as the displayed result.
    pub fn review_text(&self, text: &str) -> String {
        if !self.is_configured() {
            return MSG_KEY_MISSING.to_string();
        }
        let prompt = format!(
            "Atue como um revisor editorial experiente. Analise o seguinte texto em português e \
             aponte apenas erros ortográficos contextuais e problemas de concordância sutis. \
             Seja breve e direto. Não reescreva o texto, apenas aponte os pontos de atenção. \
             Texto: \n\n{text}"
        );
        let request = GenerateRequest {
            contents: prompt_contents(prompt),
            generation_config: None,
            system_instruction: Some(system_content(
                "Você é um consultor linguístico para escritores literários. Seu tom é formal, \
                 útil e técnico.",
            )),
            tools: None,
        };

        match self.generate(&request) {
            Ok(feedback) if !feedback.trim().is_empty() => feedback,
            Ok(_) => MSG_REVIEW_UNAVAILABLE.to_string(),
            Err(err) => {
                warn!("Review request failed: {err}");
                if is_auth_error(&err) {
                    MSG_REVIEW_AUTH.to_string()
                } else {
                    MSG_REVIEW_UNAVAILABLE.to_string()
                }
            }
        }
    }

    /// Two-to-three sentence continuation in the author's voice.
    pub fn continue_text(&self, context: &str) -> String {
        if !self.is_configured() {
            return MSG_CONTINUATION_KEY_MISSING.to_string();
        }
        let prompt = format!(
            "Atue como um co-autor literário. Analise o estilo, o tom e o contexto do seguinte \
             fragmento de texto e escreva uma continuação natural de cerca de 2 a 3 frases. \
             Mantenha estritamente a voz do autor. Não adicione introduções ou comentários seus, \
             retorne APENAS o texto sugerido para a continuação.\n\nTexto atual:\n{context}"
        );
        let request = GenerateRequest {
            contents: prompt_contents(prompt),
            generation_config: None,
            system_instruction: Some(system_content(
                "Você é um assistente criativo invisível. Sua única missão é ajudar o autor a \
                 superar bloqueios mantendo a integridade estilística da obra.",
            )),
            tools: None,
        };

        match self.generate(&request) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => MSG_CONTINUATION_EMPTY.to_string(),
            Err(err) => {
                warn!("Continuation request failed: {err}");
                MSG_CONTINUATION_UNAVAILABLE.to_string()
            }
        }
    }

    fn literary_request(&self, query: &str, use_search: bool) -> Result<LiteraryReference, String> {
        let guidance = if use_search {
            "Consulte a internet para verificar dados recentes."
        } else {
            "Use seu conhecimento literário."
        };
        let prompt = format!(
            "Analise o termo literário: \"{query}\".\n{guidance}\n\nGere um JSON estrito (sem \
             Markdown) com:\n- author: Nome\n- works: Lista de obras principais (array)\n- \
             period: Período/Movimento\n- style: Estilo (sintético)\n- themes: Temas (array)\n\n\
             Responda APENAS o JSON."
        );
        let request = GenerateRequest {
            contents: prompt_contents(prompt),
            generation_config: None,
            system_instruction: None,
            tools: use_search.then(|| {
                vec![ToolSpec {
                    google_search: json!({}),
                }]
            }),
        };
        let text = self.generate(&request)?;
        parse_literary(&text)
    }

    /// One round trip to the service, returning the first candidate's text.
    fn generate(&self, request: &GenerateRequest) -> Result<String, String> {
        let Some(api_key) = &self.api_key else {
            return Err("missing API key".to_string());
        };
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .map_err(|err| err.to_string())?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(format!("status {status}: {body}"));
        }
        let parsed: GenerateResponse = response
            .json()
            .map_err(|err| format!("invalid response: {err}"))?;
        let text = first_text(&parsed);
        debug!(bytes = text.len(), "Assistant reply received");
        Ok(text)
    }
}

fn prompt_contents(prompt: String) -> Vec<Content> {
    vec![Content {
        parts: vec![Part { text: prompt }],
    }]
}

fn system_content(instruction: &str) -> Content {
    Content {
        parts: vec![Part {
            text: instruction.to_string(),
        }],
    }
}

fn first_text(response: &GenerateResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .map(|part| part.text.as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Drop markdown code fences some replies wrap their JSON in.
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

fn is_auth_error(message: &str) -> bool {
    message.contains("401")
        || message.contains("403")
        || message.contains("API key")
        || message.contains("API_KEY")
}

fn parse_json_payload<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return Err("Resposta vazia".to_string());
    }
    serde_json::from_str(&cleaned).map_err(|err| format!("invalid JSON payload: {err}"))
}

fn parse_literary(text: &str) -> Result<LiteraryReference, String> {
    let reference: LiteraryReference = parse_json_payload(text)?;
    if reference.author.trim().is_empty() {
        return Err("JSON incompleto".to_string());
    }
    Ok(reference)
}

fn degraded_reference(message: &str) -> LiteraryReference {
    LiteraryReference {
        author: "Não encontrado".to_string(),
        period: "-".to_string(),
        style: message.to_string(),
        works: Vec::new(),
        themes: Vec::new(),
    }
}

/// Locally curated reference entries answered without any network call.
pub(crate) fn curated_reference(query: &str) -> Option<LiteraryReference> {
    let normalized = query.to_lowercase();
    let wants_volker = normalized.contains("paulo volker")
        || normalized.contains("referencia bibliograficas")
        || normalized.contains("referência bibliográficas");
    if !wants_volker {
        return None;
    }
    Some(LiteraryReference {
        author: "Paulo Volker".to_string(),
        period: "Contemporâneo".to_string(),
        style: "Filosófico, Analítico e Poético".to_string(),
        works: [
            "Livro das Bulas",
            "A Neurociência das Emoções",
            "Filosofia Contemporânea Chinesa",
            "Empresa de 1 Real",
            "O Re-verso do Filósofo",
            "Filosofia da Música",
            "Filosofia do Prompt",
            "Sistema Humano de Interrogação",
            "Estratégia da Pergunta",
            "Platão: O Algoritmo da Pergunta",
            "Manual Avançado para Mentirosos",
            "Conversas de Avião",
            "Excalibur",
            "Discursos Póstumos",
        ]
        .iter()
        .map(|work| work.to_string())
        .collect(),
        themes: [
            "Filosofia da Mente",
            "Empreendedorismo",
            "Música e Emoção",
            "Inteligência Artificial (Prompts)",
            "Educação",
        ]
        .iter()
        .map(|theme| theme.to_string())
        .collect(),
    })
}

fn dictionary_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "word": { "type": "STRING" },
            "definition": { "type": "STRING" },
            "etymology": { "type": "STRING" },
            "synonyms": { "type": "ARRAY", "items": { "type": "STRING" } },
            "antonyms": { "type": "ARRAY", "items": { "type": "STRING" } },
            "didYouMean": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["word", "definition", "synonyms", "antonyms"]
    })
}

fn rhyme_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "word": { "type": "STRING" },
            "rhymes": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "word": { "type": "STRING" },
                        "type": { "type": "STRING", "enum": ["consonante", "toante"] },
                        "syllables": { "type": "INTEGER" },
                        "tonicity": {
                            "type": "STRING",
                            "enum": ["oxítona", "paroxítona", "proparoxítona"]
                        }
                    },
                    "required": ["word", "type", "syllables", "tonicity"]
                }
            }
        },
        "required": ["word", "rhymes"]
    })
}
