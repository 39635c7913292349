//! Compiler and language configuration.
//!
//! [`CompilerConfig`] carries host-facing knobs (include paths, column
//! counting, debug dumps). [`LanguageConfig`] carries what the shader itself
//! determines: GLSL version, profile, stage and the enabled-extension set,
//! updated by `#version` and `#extension` directives during preprocessing.
//!
//! Both serialize with serde so host tooling can persist and replay
//! configurations.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// GLSL language versions understood by the front-end.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum GlslVersion {
    V110,
    V120,
    V130,
    V140,
    V150,
    V300,
    V310,
    V330,
    V400,
    V410,
    V420,
    V430,
    V440,
    V450,
    V460,
}

impl GlslVersion {
    pub fn from_number(number: u32) -> Option<GlslVersion> {
        use GlslVersion::*;
        Some(match number {
            110 => V110,
            120 => V120,
            130 => V130,
            140 => V140,
            150 => V150,
            300 => V300,
            310 => V310,
            330 => V330,
            400 => V400,
            410 => V410,
            420 => V420,
            430 => V430,
            440 => V440,
            450 => V450,
            460 => V460,
            _ => return None,
        })
    }

    pub fn number(self) -> u32 {
        use GlslVersion::*;
        match self {
            V110 => 110,
            V120 => 120,
            V130 => 130,
            V140 => 140,
            V150 => 150,
            V300 => 300,
            V310 => 310,
            V330 => 330,
            V400 => 400,
            V410 => 410,
            V420 => 420,
            V430 => 430,
            V440 => 440,
            V450 => 450,
            V460 => 460,
        }
    }

    /// Profile assumed when `#version` names no profile.
    pub fn default_profile(self) -> GlslProfile {
        use GlslVersion::*;
        match self {
            V110 | V120 | V130 | V140 | V150 => GlslProfile::Compatibility,
            V300 | V310 => GlslProfile::Es,
            V330 | V400 | V410 | V420 | V430 | V440 | V450 | V460 => GlslProfile::Core,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum GlslProfile {
    Core,
    Compatibility,
    Es,
}

impl GlslProfile {
    pub fn from_name(name: &str) -> Option<GlslProfile> {
        match name {
            "core" => Some(GlslProfile::Core),
            "compatibility" => Some(GlslProfile::Compatibility),
            "es" => Some(GlslProfile::Es),
            _ => None,
        }
    }
}

/// Pipeline stage the shader targets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum ShaderStage {
    Vertex,
    TessControl,
    TessEvaluation,
    Geometry,
    Fragment,
    Compute,
    RayGeneration,
    RayAnyHit,
    RayClosestHit,
    RayMiss,
    RayIntersection,
    RayCallable,
    Task,
    Mesh,
    #[default]
    Unknown,
}

/// Extensions the front-end knows how to track.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ExtensionId {
    ArbShadingLanguageInclude,
    GoogleIncludeDirective,
    ArbSeparateShaderObjects,
    ArbGpuShader5,
    ArbGpuShaderFp64,
    ArbShaderStorageBufferObject,
    ExtNonuniformQualifier,
    ExtBufferReference,
    ExtRayTracing,
    ExtRayQuery,
    ExtMeshShader,
    KhrShaderSubgroupBasic,
    NvRayTracing,
}

impl ExtensionId {
    pub fn from_name(name: &str) -> Option<ExtensionId> {
        use ExtensionId::*;
        Some(match name {
            "GL_ARB_shading_language_include" => ArbShadingLanguageInclude,
            "GL_GOOGLE_include_directive" => GoogleIncludeDirective,
            "GL_ARB_separate_shader_objects" => ArbSeparateShaderObjects,
            "GL_ARB_gpu_shader5" => ArbGpuShader5,
            "GL_ARB_gpu_shader_fp64" => ArbGpuShaderFp64,
            "GL_ARB_shader_storage_buffer_object" => ArbShaderStorageBufferObject,
            "GL_EXT_nonuniform_qualifier" => ExtNonuniformQualifier,
            "GL_EXT_buffer_reference" => ExtBufferReference,
            "GL_EXT_ray_tracing" => ExtRayTracing,
            "GL_EXT_ray_query" => ExtRayQuery,
            "GL_EXT_mesh_shader" => ExtMeshShader,
            "GL_KHR_shader_subgroup_basic" => KhrShaderSubgroupBasic,
            "GL_NV_ray_tracing" => NvRayTracing,
            _ => return None,
        })
    }
}

/// Requested handling of one `#extension` directive.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExtensionBehavior {
    Enable,
    Require,
    Warn,
    Disable,
}

impl ExtensionBehavior {
    pub fn from_name(name: &str) -> Option<ExtensionBehavior> {
        match name {
            "enable" => Some(ExtensionBehavior::Enable),
            "require" => Some(ExtensionBehavior::Require),
            "warn" => Some(ExtensionBehavior::Warn),
            "disable" => Some(ExtensionBehavior::Disable),
            _ => None,
        }
    }
}

/// Host-facing compiler knobs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Directories consulted, in order, for `#include` resolution.
    pub include_paths: Vec<PathBuf>,
    /// Count columns in UTF-16 code units instead of UTF-8 bytes.
    pub count_utf16_characters: bool,
    /// Maximum `#include` nesting before the directive is refused.
    pub max_include_depth: usize,
    /// Log the token stream after preprocessing.
    pub dump_tokens: bool,
    /// Log the AST after parsing.
    pub dump_ast: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            include_paths: Vec::new(),
            count_utf16_characters: false,
            max_include_depth: 16,
            dump_tokens: false,
            dump_ast: false,
        }
    }
}

/// Per-shader language settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub version: GlslVersion,
    pub profile: GlslProfile,
    pub stage: ShaderStage,
    pub extensions: HashSet<ExtensionId>,
    /// Skip the system preamble entirely.
    pub no_stdlib: bool,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        LanguageConfig {
            version: GlslVersion::V460,
            profile: GlslVersion::V460.default_profile(),
            stage: ShaderStage::Unknown,
            extensions: HashSet::new(),
            no_stdlib: false,
        }
    }
}

impl LanguageConfig {
    /// Applies a `#version` directive.
    pub fn set_version(&mut self, version: GlslVersion, profile: Option<GlslProfile>) {
        self.version = version;
        self.profile = profile.unwrap_or_else(|| version.default_profile());
    }

    /// Applies an `#extension` directive to the enabled set.
    pub fn apply_extension(&mut self, extension: ExtensionId, behavior: ExtensionBehavior) {
        match behavior {
            ExtensionBehavior::Enable | ExtensionBehavior::Require | ExtensionBehavior::Warn => {
                self.extensions.insert(extension);
            }
            ExtensionBehavior::Disable => {
                self.extensions.remove(&extension);
            }
        }
    }

    pub fn is_extension_enabled(&self, extension: ExtensionId) -> bool {
        self.extensions.contains(&extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_numbers_round_trip() {
        for number in [110, 120, 130, 140, 150, 300, 310, 330, 400, 410, 420, 430, 440, 450, 460] {
            let version = GlslVersion::from_number(number).unwrap();
            assert_eq!(version.number(), number);
        }
        assert_eq!(GlslVersion::from_number(200), None);
    }

    #[test]
    fn default_profiles_follow_version() {
        assert_eq!(GlslVersion::V150.default_profile(), GlslProfile::Compatibility);
        assert_eq!(GlslVersion::V300.default_profile(), GlslProfile::Es);
        assert_eq!(GlslVersion::V460.default_profile(), GlslProfile::Core);
    }

    #[test]
    fn set_version_without_profile_derives_default() {
        let mut config = LanguageConfig::default();
        config.set_version(GlslVersion::V330, None);
        assert_eq!(config.profile, GlslProfile::Core);
        config.set_version(GlslVersion::V120, Some(GlslProfile::Core));
        assert_eq!(config.profile, GlslProfile::Core);
    }

    #[test]
    fn extension_toggling() {
        let mut config = LanguageConfig::default();
        config.apply_extension(ExtensionId::ExtRayTracing, ExtensionBehavior::Require);
        assert!(config.is_extension_enabled(ExtensionId::ExtRayTracing));
        config.apply_extension(ExtensionId::ExtRayTracing, ExtensionBehavior::Disable);
        assert!(!config.is_extension_enabled(ExtensionId::ExtRayTracing));
    }

    #[test]
    fn behavior_names_parse() {
        assert_eq!(ExtensionBehavior::from_name("enable"), Some(ExtensionBehavior::Enable));
        assert_eq!(ExtensionBehavior::from_name("require"), Some(ExtensionBehavior::Require));
        assert_eq!(ExtensionBehavior::from_name("warn"), Some(ExtensionBehavior::Warn));
        assert_eq!(ExtensionBehavior::from_name("disable"), Some(ExtensionBehavior::Disable));
        assert_eq!(ExtensionBehavior::from_name("maybe"), None);
    }

    #[test]
    fn compiler_config_serde_round_trip() {
        let config = CompilerConfig {
            include_paths: vec![PathBuf::from("/usr/include/shaders")],
            count_utf16_characters: true,
            max_include_depth: 8,
            dump_tokens: true,
            dump_ast: false,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: CompilerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.include_paths, config.include_paths);
        assert_eq!(back.max_include_depth, 8);
        assert!(back.count_utf16_characters);
    }
}
