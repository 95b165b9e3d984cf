use qs_core::ConfigError;

/// Selects the device processing-time distribution. A fifth, optional
/// header beyond `Requests:`/`Buffer:`/`Sources:`/`Devices:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Deterministic,
    Exponential,
}

/// The configuration file, parsed but not yet validated against the
/// simulator's construction requirements.
#[derive(Debug, Clone)]
pub struct RawConfig {
    pub target_amount_of_requests: u64,
    pub buffer_capacity: usize,
    pub source_periods: Vec<u64>,
    pub device_coefficients: Vec<f64>,
    pub mode: Mode,
}

const HEADERS: &[&str] = &["Requests:", "Buffer:", "Sources:", "Devices:", "Mode:"];

fn is_header(token: &str) -> bool {
    HEADERS.contains(&token)
}

/// Parses the header-keyed configuration text format: headers may appear in
/// any order, and `Sources:`/`Devices:` consume numeric tokens greedily
/// until the next header or end of input.
pub fn parse(input: &str) -> Result<RawConfig, ConfigError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();

    let mut target: Option<u64> = None;
    let mut buffer: Option<usize> = None;
    let mut sources: Option<Vec<u64>> = None;
    let mut devices: Option<Vec<f64>> = None;
    let mut mode: Option<Mode> = None;

    let mut i = 0;
    while i < tokens.len() {
        let header = tokens[i];
        i += 1;
        match header {
            "Requests:" => {
                if target.is_some() {
                    return Err(ConfigError::DuplicateHeader("Requests:"));
                }
                let token = tokens
                    .get(i)
                    .ok_or(ConfigError::MissingHeader("Requests:"))?;
                target = Some(parse_number(header, token)?);
                i += 1;
            }
            "Buffer:" => {
                if buffer.is_some() {
                    return Err(ConfigError::DuplicateHeader("Buffer:"));
                }
                let token = tokens.get(i).ok_or(ConfigError::MissingHeader("Buffer:"))?;
                buffer = Some(parse_number(header, token)?);
                i += 1;
            }
            "Sources:" => {
                if sources.is_some() {
                    return Err(ConfigError::DuplicateHeader("Sources:"));
                }
                let mut values = Vec::new();
                while let Some(&token) = tokens.get(i) {
                    if is_header(token) {
                        break;
                    }
                    values.push(parse_number(header, token)?);
                    i += 1;
                }
                sources = Some(values);
            }
            "Devices:" => {
                if devices.is_some() {
                    return Err(ConfigError::DuplicateHeader("Devices:"));
                }
                let mut values = Vec::new();
                while let Some(&token) = tokens.get(i) {
                    if is_header(token) {
                        break;
                    }
                    values.push(parse_float("Devices:", token)?);
                    i += 1;
                }
                devices = Some(values);
            }
            "Mode:" => {
                if mode.is_some() {
                    return Err(ConfigError::DuplicateHeader("Mode:"));
                }
                let token = tokens.get(i).ok_or(ConfigError::MissingHeader("Mode:"))?;
                mode = Some(match *token {
                    "deterministic" => Mode::Deterministic,
                    "exponential" => Mode::Exponential,
                    other => return Err(ConfigError::InvalidMode(other.to_string())),
                });
                i += 1;
            }
            other => return Err(ConfigError::UnknownHeader(other.to_string())),
        }
    }

    let target = target.ok_or(ConfigError::MissingHeader("Requests:"))?;
    let buffer_capacity = buffer.ok_or(ConfigError::MissingHeader("Buffer:"))?;
    let source_periods = sources.ok_or(ConfigError::MissingHeader("Sources:"))?;
    let device_coefficients = devices.ok_or(ConfigError::MissingHeader("Devices:"))?;
    let mode = mode.unwrap_or(Mode::Exponential);

    if source_periods.is_empty() {
        return Err(ConfigError::EmptySources);
    }
    if device_coefficients.is_empty() {
        return Err(ConfigError::EmptyDevices);
    }
    if target == 0 {
        return Err(ConfigError::NonPositiveTarget);
    }

    Ok(RawConfig {
        target_amount_of_requests: target,
        buffer_capacity,
        source_periods,
        device_coefficients,
        mode,
    })
}

fn parse_number<T: std::str::FromStr>(header: &'static str, token: &str) -> Result<T, ConfigError> {
    token.parse().map_err(|_| ConfigError::MalformedNumber {
        header,
        token: token.to_string(),
    })
}

fn parse_float(header: &'static str, token: &str) -> Result<f64, ConfigError> {
    token.parse().map_err(|_| ConfigError::MalformedNumber {
        header,
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_complete_config_regardless_of_header_order() {
        let text = "Buffer: 4\nRequests: 100\nDevices: 1.0 2.0\nSources: 5 7";
        let config = parse(text).unwrap();
        assert_eq!(config.buffer_capacity, 4);
        assert_eq!(config.target_amount_of_requests, 100);
        assert_eq!(config.source_periods, vec![5, 7]);
        assert_eq!(config.device_coefficients, vec![1.0, 2.0]);
        assert_eq!(config.mode, Mode::Exponential);
    }

    #[test]
    fn mode_header_is_optional_and_defaults_to_exponential() {
        let text = "Requests: 1\nBuffer: 0\nSources: 1\nDevices: 1.0";
        assert_eq!(parse(text).unwrap().mode, Mode::Exponential);
    }

    #[test]
    fn explicit_deterministic_mode_is_honored() {
        let text = "Requests: 1\nBuffer: 0\nSources: 1\nDevices: 1.0\nMode: deterministic";
        assert_eq!(parse(text).unwrap().mode, Mode::Deterministic);
    }

    #[test]
    fn sources_consume_tokens_greedily_until_the_next_header() {
        let text = "Requests: 1\nBuffer: 0\nSources: 1 2 3\nDevices: 1.0";
        let config = parse(text).unwrap();
        assert_eq!(config.source_periods, vec![1, 2, 3]);
    }

    #[test]
    fn unknown_header_is_rejected() {
        let text = "Requests: 1\nBuffer: 0\nSources: 1\nDevices: 1.0\nBogus: 1";
        assert!(matches!(parse(text), Err(ConfigError::UnknownHeader(_))));
    }

    #[test]
    fn duplicate_header_is_rejected() {
        let text = "Requests: 1\nRequests: 2\nBuffer: 0\nSources: 1\nDevices: 1.0";
        assert!(matches!(parse(text), Err(ConfigError::DuplicateHeader("Requests:"))));
    }

    #[test]
    fn missing_header_is_rejected() {
        let text = "Buffer: 0\nSources: 1\nDevices: 1.0";
        assert!(matches!(parse(text), Err(ConfigError::MissingHeader("Requests:"))));
    }

    #[test]
    fn empty_sources_is_rejected() {
        let text = "Requests: 1\nBuffer: 0\nSources:\nDevices: 1.0";
        assert!(matches!(parse(text), Err(ConfigError::EmptySources)));
    }

    #[test]
    fn zero_target_is_rejected() {
        let text = "Requests: 0\nBuffer: 0\nSources: 1\nDevices: 1.0";
        assert!(matches!(parse(text), Err(ConfigError::NonPositiveTarget)));
    }

    #[test]
    fn zero_capacity_buffer_parses_successfully() {
        // Zero is a legal buffer capacity (unbuffered system), not an error.
        let text = "Requests: 1\nBuffer: 0\nSources: 1\nDevices: 1.0";
        assert_eq!(parse(text).unwrap().buffer_capacity, 0);
    }

    #[test]
    fn malformed_number_is_reported_with_the_offending_token() {
        let text = "Requests: abc\nBuffer: 0\nSources: 1\nDevices: 1.0";
        match parse(text) {
            Err(ConfigError::MalformedNumber { header, token }) => {
                assert_eq!(header, "Requests:");
                assert_eq!(token, "abc");
            }
            other => panic!("expected MalformedNumber, got {other:?}"),
        }
    }
}
