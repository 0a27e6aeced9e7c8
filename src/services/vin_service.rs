//! Validación de VIN
//!
//! Validación estructural y de checksum de un Vehicle Identification Number
//! de 17 caracteres. Función pura, sin efectos secundarios.
//!
//! El mismatch de checksum se reporta como warning salvo que la
//! configuración active el modo estricto (VIN_STRICT_CHECKSUM): hay VINs
//! reales pre-1981 y de algunos mercados que no cumplen el dígito de
//! control norteamericano.

/// Tabla de pesos por posición (la posición 8 es el dígito de control)
const WEIGHTS: [u32; 17] = [8, 7, 6, 5, 4, 3, 2, 10, 0, 9, 8, 7, 6, 5, 4, 3, 2];

/// Posición del dígito de control dentro del VIN
const CHECK_DIGIT_INDEX: usize = 8;

/// Resultado de la validación de un VIN
#[derive(Debug, Clone)]
pub struct VinValidation {
    pub vin: String,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Transliteración de caracteres VIN a valores numéricos.
/// Las letras I, O y Q no existen en un VIN válido.
fn transliterate(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - '0' as u32),
        'A' => Some(1),
        'B' => Some(2),
        'C' => Some(3),
        'D' => Some(4),
        'E' => Some(5),
        'F' => Some(6),
        'G' => Some(7),
        'H' => Some(8),
        'J' => Some(1),
        'K' => Some(2),
        'L' => Some(3),
        'M' => Some(4),
        'N' => Some(5),
        'P' => Some(7),
        'R' => Some(9),
        'S' => Some(2),
        'T' => Some(3),
        'U' => Some(4),
        'V' => Some(5),
        'W' => Some(6),
        'X' => Some(7),
        'Y' => Some(8),
        'Z' => Some(9),
        _ => None,
    }
}

/// Calcular el dígito de control esperado de un VIN de 17 caracteres.
///
/// Devuelve `None` si el VIN contiene caracteres fuera del alfabeto VIN.
/// Determinista: el mismo VIN produce siempre el mismo carácter.
pub fn compute_check_digit(vin: &str) -> Option<char> {
    if vin.len() != 17 {
        return None;
    }

    let mut sum: u32 = 0;
    for (i, c) in vin.chars().enumerate() {
        if i == CHECK_DIGIT_INDEX {
            continue;
        }
        sum += transliterate(c)? * WEIGHTS[i];
    }

    let remainder = sum % 11;
    if remainder == 10 {
        Some('X')
    } else {
        char::from_digit(remainder, 10)
    }
}

/// Validar un VIN candidato.
///
/// - Longitud distinta de 17 -> error duro (sin importar el contenido).
/// - Caracteres I, O, Q o fuera del alfabeto -> error duro.
/// - Checksum incorrecto -> warning, o error duro con `strict_checksum`.
pub fn validate_vin(candidate: &str, strict_checksum: bool) -> VinValidation {
    let vin = candidate.trim().to_uppercase();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if vin.len() != 17 {
        errors.push(format!(
            "El VIN debe tener exactamente 17 caracteres (recibidos: {})",
            vin.len()
        ));
        return VinValidation {
            vin,
            is_valid: false,
            errors,
            warnings,
        };
    }

    let mut bad_chars: Vec<char> = Vec::new();
    for c in vin.chars() {
        if matches!(c, 'I' | 'O' | 'Q') || transliterate(c).is_none() {
            if !bad_chars.contains(&c) {
                bad_chars.push(c);
            }
        }
    }

    if !bad_chars.is_empty() {
        errors.push(format!(
            "El VIN contiene caracteres no permitidos: {}",
            bad_chars.iter().collect::<String>()
        ));
        return VinValidation {
            vin,
            is_valid: false,
            errors,
            warnings,
        };
    }

    // A esta altura el alfabeto es válido, el checksum siempre se puede calcular
    if let Some(expected) = compute_check_digit(&vin) {
        let actual = vin.chars().nth(CHECK_DIGIT_INDEX).unwrap_or(' ');
        if expected != actual {
            let message = format!(
                "Dígito de control incorrecto: esperado '{}', encontrado '{}'",
                expected, actual
            );
            if strict_checksum {
                errors.push(message);
            } else {
                warnings.push(message);
            }
        }
    }

    VinValidation {
        is_valid: errors.is_empty(),
        vin,
        errors,
        warnings,
    }
}

/// Año de modelo aproximado según el carácter en la posición 10.
/// El código se repite cada 30 años; se asume el ciclo 1980-2009 / 2010-2039.
pub fn model_year_hint(vin: &str) -> Option<i32> {
    let code = vin.chars().nth(9)?;
    let base = match code {
        'A'..='H' => Some(2010 + (code as i32 - 'A' as i32)),
        'J'..='N' => Some(2018 + (code as i32 - 'J' as i32)),
        'P' => Some(2023),
        'R'..='T' => Some(2024 + (code as i32 - 'R' as i32)),
        'V'..='Y' => Some(2027 + (code as i32 - 'V' as i32)),
        '1'..='9' => Some(2031 + (code as i32 - '1' as i32)),
        _ => None,
    }?;
    Some(base)
}

/// Región de fabricación según el primer carácter del VIN
pub fn region_hint(vin: &str) -> Option<&'static str> {
    let first = vin.chars().next()?;
    match first {
        '1' | '4' | '5' => Some("North America (US)"),
        '2' => Some("North America (Canada)"),
        '3' => Some("North America (Mexico)"),
        '6' | '7' => Some("Oceania"),
        '8' | '9' => Some("South America"),
        'A'..='H' => Some("Africa/Asia"),
        'J' => Some("Asia (Japan)"),
        'K' => Some("Asia (Korea)"),
        'L' => Some("Asia (China)"),
        'S'..='Z' => Some("Europe"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // VIN con checksum correcto ('X' en la posición 9)
    const VALID_VIN: &str = "1M8GDM9AXKP042788";
    // VIN de prueba con checksum incorrecto ('0' donde se espera 'X')
    const TEST_VIN: &str = "1HD1KBC10EB123457";

    #[test]
    fn test_compute_check_digit_is_deterministic() {
        for _ in 0..10 {
            assert_eq!(compute_check_digit(VALID_VIN), Some('X'));
            assert_eq!(compute_check_digit("11111111111111111"), Some('1'));
        }
    }

    #[test]
    fn test_valid_vin_passes() {
        let result = validate_vin(VALID_VIN, false);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_length_error_regardless_of_content() {
        for candidate in ["", "1M8GDM9AXKP04278", "1M8GDM9AXKP0427888", "###"] {
            let result = validate_vin(candidate, false);
            assert!(!result.is_valid);
            assert!(result.errors[0].contains("17 caracteres"));
        }
    }

    #[test]
    fn test_forbidden_characters_are_hard_errors() {
        // I, O y Q no existen en el alfabeto VIN
        let result = validate_vin("1M8GDM9AXKP04278I", false);
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("no permitidos"));
    }

    #[test]
    fn test_checksum_mismatch_is_warning_by_default() {
        let result = validate_vin(TEST_VIN, false);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("esperado 'X'"));
    }

    #[test]
    fn test_checksum_mismatch_is_error_in_strict_mode() {
        let result = validate_vin(TEST_VIN, true);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_lowercase_input_is_normalized() {
        let result = validate_vin("1m8gdm9axkp042788", false);
        assert!(result.is_valid);
        assert_eq!(result.vin, VALID_VIN);
    }

    #[test]
    fn test_region_hint() {
        assert_eq!(region_hint(VALID_VIN), Some("North America (US)"));
        assert_eq!(region_hint("JH2SC5900FM000000"), Some("Asia (Japan)"));
    }

    #[test]
    fn test_model_year_hint() {
        // 'K' en posición 10 -> 2019
        assert_eq!(model_year_hint(VALID_VIN), Some(2019));
    }
}
