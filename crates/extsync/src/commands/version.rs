//! Version command

use crate::cli::VersionArgs;
use crate::version::VersionInfo;
use anyhow::Result;

pub fn run(args: VersionArgs) -> Result<()> {
    let info = VersionInfo::current();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", info.display());
        println!("Engine:     extsync-extensions {}", info.engine);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info_current_is_valid_semver() {
        let info = VersionInfo::current();
        let parsed = semver::Version::parse(&info.version);
        assert!(
            parsed.is_ok(),
            "version should be valid semver, got: {}",
            info.version
        );
    }

    #[test]
    fn test_engine_version_matches_workspace() {
        let info = VersionInfo::current();
        assert_eq!(info.engine, info.version);
    }

    #[test]
    fn test_version_info_display_trait() {
        let info = VersionInfo::current();
        assert!(info.display().starts_with("extsync "));
        assert_eq!(format!("{}", info), info.display());
    }

    #[test]
    fn test_version_info_json_round_trip() {
        let info = VersionInfo::current();
        let json = serde_json::to_string(&info).expect("should serialize to JSON");

        let deserialized: VersionInfo =
            serde_json::from_str(&json).expect("should deserialize from JSON");
        assert_eq!(deserialized.version, info.version);
        assert_eq!(deserialized.engine, info.engine);
    }

    #[test]
    fn test_version_info_display_with_commit() {
        let info = VersionInfo {
            version: "1.2.3".to_string(),
            commit: Some("abc1234".to_string()),
            engine: "1.2.3".to_string(),
        };
        assert_eq!(info.display(), "extsync 1.2.3 (abc1234)");
    }
}
