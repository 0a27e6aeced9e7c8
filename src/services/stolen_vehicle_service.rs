//! Agregador de chequeo de vehículos robados
//!
//! Cadena ordenada de providers consultados secuencialmente con
//! short-circuit en el primer hit positivo:
//!
//! 1. Registro local de vehículos robados (fail-fast, evita llamadas externas)
//! 2. Servicio externo de decodificación de VIN (enriquecimiento, no fatal)
//! 3. Servicio nacional de robos, o el provider simulado si no hay credencial
//!
//! Cada fallo externo se convierte en un campo soft dentro del reporte:
//! datos parciales antes que fallo total. El reporte final se upsertea en
//! el historial de verificaciones por VIN (last-write-wins).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::verification_repository::VerificationRepository;
use crate::utils::errors::AppError;

/// Origen del resultado del chequeo de robo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSource {
    LocalDb,
    Nicb,
    Simulated,
}

impl ReportSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportSource::LocalDb => "local_db",
            ReportSource::Nicb => "nicb",
            ReportSource::Simulated => "simulated",
        }
    }
}

/// Resultado parcial de un provider
#[derive(Debug, Clone, Default)]
pub struct ProviderResult {
    pub is_stolen: bool,
    pub report_id: Option<String>,
    pub reported_date: Option<DateTime<Utc>>,
}

/// Capacidad común de lookup: los providers se componen en una lista
/// ordenada, agregar o quitar uno no toca el flujo de control.
#[async_trait]
pub trait StolenVehicleProvider: Send + Sync {
    fn source(&self) -> ReportSource;
    async fn lookup(&self, vin: &str) -> Result<ProviderResult, AppError>;
}

/// Reporte agregado devuelto al caller
#[derive(Debug, Clone)]
pub struct StolenVehicleReport {
    pub vin: String,
    pub is_stolen: bool,
    pub source: ReportSource,
    pub report_id: Option<String>,
    pub reported_date: Option<DateTime<Utc>>,
    pub vehicle_info: serde_json::Value,
    pub last_checked: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Provider 1: registro local de vehículos robados (tabla propia)
pub struct LocalRegistryProvider {
    pool: PgPool,
}

impl LocalRegistryProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StolenVehicleProvider for LocalRegistryProvider {
    fn source(&self) -> ReportSource {
        ReportSource::LocalDb
    }

    async fn lookup(&self, vin: &str) -> Result<ProviderResult, AppError> {
        let repository = VerificationRepository::new(self.pool.clone());
        let record = repository.find_stolen_record(vin).await?;

        Ok(match record {
            Some(record) => ProviderResult {
                is_stolen: true,
                report_id: Some(record.report_id),
                reported_date: Some(record.reported_date),
            },
            None => ProviderResult::default(),
        })
    }
}

/// Provider 2: servicio nacional de robos (requiere credencial)
pub struct NicbProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl NicbProvider {
    pub fn new(client: reqwest::Client, api_url: String, api_key: String) -> Self {
        Self {
            client,
            api_url,
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NicbResponse {
    #[serde(default)]
    theft_record_found: bool,
    record_id: Option<String>,
    report_date: Option<DateTime<Utc>>,
}

#[async_trait]
impl StolenVehicleProvider for NicbProvider {
    fn source(&self) -> ReportSource {
        ReportSource::Nicb
    }

    async fn lookup(&self, vin: &str) -> Result<ProviderResult, AppError> {
        let url = format!("{}?vin={}", self.api_url, urlencoding::encode(vin));

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalApi(format!(
                "NICB lookup failed with status {}",
                status
            )));
        }

        let body: NicbResponse = response.json().await?;

        Ok(ProviderResult {
            is_stolen: body.theft_record_found,
            report_id: body.record_id,
            reported_date: body.report_date,
        })
    }
}

/// Provider simulado: SOLO para entornos sin credencial NICB.
///
/// Stub explícito de simulación con una allowlist fija de VINs de prueba
/// conocidos. Se selecciona únicamente cuando no hay NICB_API_KEY
/// configurada; nunca debe habilitarse en producción.
pub struct SimulatedProvider;

/// VINs de prueba que el modo simulado reporta como robados
const SIMULATED_STOLEN_VINS: [&str; 3] = [
    "1HD1KBC10EB123457",
    "1G1ZT53826F109149",
    "2HGES16575H591230",
];

#[async_trait]
impl StolenVehicleProvider for SimulatedProvider {
    fn source(&self) -> ReportSource {
        ReportSource::Simulated
    }

    async fn lookup(&self, vin: &str) -> Result<ProviderResult, AppError> {
        log::warn!("⚠️ Chequeo de robo en MODO SIMULADO (sin credencial NICB) para VIN {}", vin);

        Ok(if SIMULATED_STOLEN_VINS.contains(&vin) {
            ProviderResult {
                is_stolen: true,
                report_id: Some(format!("SIM-{}", vin.get(..8).unwrap_or(vin))),
                reported_date: None,
            }
        } else {
            ProviderResult::default()
        })
    }
}

// ---------------------------------------------------------------------------
// Decodificación del vehículo (enriquecimiento, no es un provider de robo)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DecodeResponse {
    #[serde(rename = "Results", default)]
    results: Vec<DecodeResult>,
}

#[derive(Debug, Deserialize)]
struct DecodeResult {
    #[serde(rename = "Make")]
    make: Option<String>,
    #[serde(rename = "Model")]
    model: Option<String>,
    #[serde(rename = "ModelYear")]
    model_year: Option<String>,
    #[serde(rename = "VehicleType")]
    vehicle_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Servicio agregador
// ---------------------------------------------------------------------------

pub struct StolenVehicleService {
    pool: PgPool,
    client: reqwest::Client,
    decode_url: String,
    providers: Vec<Box<dyn StolenVehicleProvider>>,
}

impl StolenVehicleService {
    pub fn new(pool: PgPool, client: reqwest::Client, config: &EnvironmentConfig) -> Self {
        let mut providers: Vec<Box<dyn StolenVehicleProvider>> =
            vec![Box::new(LocalRegistryProvider::new(pool.clone()))];

        match &config.nicb_api_key {
            Some(api_key) => {
                providers.push(Box::new(NicbProvider::new(
                    client.clone(),
                    config.nicb_api_url.clone(),
                    api_key.clone(),
                )));
            }
            None => {
                providers.push(Box::new(SimulatedProvider));
            }
        }

        Self {
            pool,
            client,
            decode_url: config.vehicle_decode_url.clone(),
            providers,
        }
    }

    /// Ejecutar la cadena de providers y persistir el reporte agregado
    pub async fn check_vin(&self, vin: &str) -> Result<StolenVehicleReport, AppError> {
        let mut report = StolenVehicleReport {
            vin: vin.to_string(),
            is_stolen: false,
            source: ReportSource::Simulated,
            report_id: None,
            reported_date: None,
            vehicle_info: json!({}),
            last_checked: Utc::now(),
        };

        for provider in &self.providers {
            match provider.lookup(vin).await {
                Ok(result) if result.is_stolen => {
                    log::warn!(
                        "🚨 VIN {} reportado como robado por {}",
                        vin,
                        provider.source().as_str()
                    );
                    report.is_stolen = true;
                    report.source = provider.source();
                    report.report_id = result.report_id;
                    report.reported_date = result.reported_date;
                    break;
                }
                Ok(_) => {
                    report.source = provider.source();
                }
                Err(e) => {
                    // Fallo externo -> campo soft, la cadena continúa
                    log::error!(
                        "❌ Provider {} falló para VIN {}: {}",
                        provider.source().as_str(),
                        vin,
                        e
                    );
                    report.vehicle_info[format!("{}_error", provider.source().as_str())] =
                        json!(e.to_string());
                }
            }

            // Tras el registro local (sin hit) se enriquece con los datos
            // descriptivos del vehículo; un fallo aquí no aborta el flujo
            if provider.source() == ReportSource::LocalDb {
                let decoded = self.decode_vehicle(vin).await;
                if let (Some(target), Some(fields)) =
                    (report.vehicle_info.as_object_mut(), decoded.as_object())
                {
                    for (key, value) in fields {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        let repository = VerificationRepository::new(self.pool.clone());
        repository.upsert_vin_verification(&report).await?;

        Ok(report)
    }

    /// Consultar el servicio de decodificación para make/model/year.
    /// El fallo se representa como `{"error": ...}` y nunca es fatal.
    async fn decode_vehicle(&self, vin: &str) -> serde_json::Value {
        let url = format!(
            "{}/DecodeVinValues/{}?format=json",
            self.decode_url,
            urlencoding::encode(vin)
        );

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("⚠️ Decodificación de VIN {} falló: {}", vin, e);
                return json!({ "error": format!("decode request failed: {}", e) });
            }
        };

        if !response.status().is_success() {
            log::warn!(
                "⚠️ Decodificación de VIN {} devolvió status {}",
                vin,
                response.status()
            );
            return json!({ "error": format!("decode service returned {}", response.status()) });
        }

        match response.json::<DecodeResponse>().await {
            Ok(decoded) => match decoded.results.into_iter().next() {
                Some(result) => json!({
                    "make": result.make,
                    "model": result.model,
                    "model_year": result.model_year,
                    "vehicle_type": result.vehicle_type,
                }),
                None => json!({ "error": "decode service returned no results" }),
            },
            Err(e) => json!({ "error": format!("decode response parse failed: {}", e) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_provider_flags_known_test_vin() {
        let provider = SimulatedProvider;
        let result = provider.lookup("1HD1KBC10EB123457").await.unwrap();
        assert!(result.is_stolen);
        assert!(result.report_id.unwrap().starts_with("SIM-"));
        assert_eq!(provider.source(), ReportSource::Simulated);
    }

    #[tokio::test]
    async fn test_simulated_provider_passes_unknown_vin() {
        let provider = SimulatedProvider;
        let result = provider.lookup("1M8GDM9AXKP042788").await.unwrap();
        assert!(!result.is_stolen);
        assert!(result.report_id.is_none());
    }

    #[test]
    fn test_report_source_labels() {
        assert_eq!(ReportSource::LocalDb.as_str(), "local_db");
        assert_eq!(ReportSource::Nicb.as_str(), "nicb");
        assert_eq!(ReportSource::Simulated.as_str(), "simulated");
    }
}
