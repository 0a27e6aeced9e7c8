//! Servicio de SMS para códigos OTP
//!
//! Envía el código por el proveedor configurado via HTTP. Sin credenciales
//! configuradas cae en modo simulado: el código se loguea y no sale ningún
//! SMS real. El modo simulado está pensado solo para desarrollo.

use crate::config::environment::EnvironmentConfig;
use crate::utils::errors::AppError;

pub struct SmsService {
    client: reqwest::Client,
    api_url: Option<String>,
    account_sid: Option<String>,
    auth_token: Option<String>,
    from_number: Option<String>,
}

impl SmsService {
    pub fn new(client: reqwest::Client, config: &EnvironmentConfig) -> Self {
        Self {
            client,
            api_url: config.sms_api_url.clone(),
            account_sid: config.sms_account_sid.clone(),
            auth_token: config.sms_auth_token.clone(),
            from_number: config.sms_from_number.clone(),
        }
    }

    fn is_configured(&self) -> bool {
        self.api_url.is_some()
            && self.account_sid.is_some()
            && self.auth_token.is_some()
            && self.from_number.is_some()
    }

    /// Enviar un código de verificación al teléfono indicado
    pub async fn send_verification_code(&self, phone: &str, code: &str) -> Result<(), AppError> {
        if !self.is_configured() {
            log::warn!(
                "📱 [SIMULADO] SMS sin proveedor configurado. Código para {}: {}",
                phone,
                code
            );
            return Ok(());
        }

        let api_url = self.api_url.as_deref().unwrap_or_default();
        let account_sid = self.account_sid.as_deref().unwrap_or_default();
        let auth_token = self.auth_token.as_deref().unwrap_or_default();
        let from_number = self.from_number.as_deref().unwrap_or_default();

        log::info!("📱 Enviando SMS de verificación a {}", phone);

        let body = format!(
            "Tu código de verificación de SafeTrade es {}. Caduca en 10 minutos.",
            code
        );

        let response = self
            .client
            .post(format!("{}/Accounts/{}/Messages.json", api_url, account_sid))
            .basic_auth(account_sid, Some(auth_token))
            .form(&[("To", phone), ("From", from_number), ("Body", &body)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ Envío de SMS falló con status {}: {}", status, error_text);
            return Err(AppError::ExternalApi(format!(
                "SMS provider returned {}",
                status
            )));
        }

        log::info!("✅ SMS enviado a {}", phone);
        Ok(())
    }
}
