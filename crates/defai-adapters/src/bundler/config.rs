//! Typed webpack configuration, rendered to a CommonJS module.
//!
//! The config is a plain serde value. Things JSON cannot express (regular
//! expressions, `path.resolve(...)` calls, plugin constructors) are carried
//! as [`JsExpr`] and emitted verbatim by [`WebpackConfig::to_js`].

use std::{collections::BTreeMap, fs, path::PathBuf};

use serde::{Serialize, Serializer};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::{BundlerError, BundlerOptions, Mode};

/// Performance hint threshold for entrypoints and assets, in bytes.
pub const PERFORMANCE_BUDGET: u64 = 512_000;

/// Images below this size are inlined as data URLs.
const INLINE_ASSET_LIMIT: u64 = 8 * 1024;

const EXPR_MARK: &str = "\u{0}js:";

/// Routes served by the preview server and proxied by the dev server.
pub const PROXIED_ROUTES: [&str; 4] = ["/preview", "/api-docs", "/api", "/manifest.json"];

// ============================================================================
// JavaScript expressions
// ============================================================================

/// A JavaScript expression emitted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsExpr(String);

impl JsExpr {
    pub fn raw(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    /// `/pattern/`
    pub fn regex(pattern: &str) -> Self {
        Self(format!("/{pattern}/"))
    }

    /// Path relative to the project root, resolved from the config file's
    /// own directory.
    pub fn project_path(relative: &str) -> Self {
        if relative.is_empty() || relative == "." {
            return Self::raw("path.resolve(__dirname, '..')");
        }
        Self(format!(
            "path.resolve(__dirname, '..', {})",
            js_string(&relative.replace('\\', "/"))
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Serialize for JsExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{EXPR_MARK}{}", self.0))
    }
}

/// `false` or a value, as several webpack options accept.
#[derive(Debug, Clone, PartialEq)]
pub enum Toggle<T> {
    On(T),
    Off,
}

impl<T> Toggle<T> {
    fn when(condition: bool, value: impl FnOnce() -> T) -> Self {
        if condition { Self::On(value()) } else { Self::Off }
    }
}

impl<T: Serialize> Serialize for Toggle<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::On(value) => value.serialize(serializer),
            Self::Off => serializer.serialize_bool(false),
        }
    }
}

// ============================================================================
// Config sections
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebpackConfig {
    pub mode: Mode,
    pub context: JsExpr,
    pub entry: String,
    pub output: Output,
    pub resolve: Resolve,
    pub module: ModuleRules,
    pub devtool: Toggle<&'static str>,
    pub optimization: Optimization,
    pub performance: Performance,
    pub stats: Stats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_server: Option<DevServer>,
    pub plugins: Vec<JsExpr>,
    #[serde(skip)]
    analyze: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    pub path: JsExpr,
    pub filename: &'static str,
    pub chunk_filename: &'static str,
    pub public_path: &'static str,
    pub clean: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Resolve {
    pub extensions: Vec<&'static str>,
    pub alias: BTreeMap<&'static str, JsExpr>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleRules {
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rule {
    pub test: JsExpr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<JsExpr>,
    #[serde(rename = "use", skip_serializing_if = "Vec::is_empty")]
    pub loaders: Vec<Loader>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Loader {
    pub loader: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Optimization {
    pub minimize: bool,
    pub split_chunks: Toggle<SplitChunks>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitChunks {
    pub chunks: &'static str,
    pub cache_groups: BTreeMap<&'static str, CacheGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheGroup {
    pub test: JsExpr,
    pub name: &'static str,
    pub chunks: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub hints: Toggle<&'static str>,
    pub max_entrypoint_size: u64,
    pub max_asset_size: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub colors: bool,
    pub modules: bool,
    pub children: bool,
    pub chunks: bool,
    pub chunk_modules: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServer {
    pub host: String,
    pub port: u16,
    pub hot: bool,
    pub compress: bool,
    pub history_api_fallback: bool,
    pub open: bool,
    #[serde(rename = "static")]
    pub static_dir: StaticDir,
    pub headers: BTreeMap<&'static str, &'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub proxy: Vec<Proxy>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticDir {
    pub directory: JsExpr,
    pub public_path: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Proxy {
    pub context: Vec<&'static str>,
    pub target: String,
}

// ============================================================================
// Assembly
// ============================================================================

impl WebpackConfig {
    /// Configuration for `options`, bundling `entry` (relative to the
    /// project root).
    pub fn new(options: &BundlerOptions, entry: &str) -> Self {
        let production = options.mode.is_production();
        let development = !production;
        let hot = development && options.hot;

        let output_path = if options.output_dir.is_absolute() {
            JsExpr::raw(js_string(&options.output_dir.to_string_lossy()))
        } else {
            JsExpr::project_path(&options.output_dir.to_string_lossy())
        };

        let mut plugins = vec![html_plugin(production), define_plugin(options.mode)];
        if hot {
            plugins.push(JsExpr::raw("new webpack.HotModuleReplacementPlugin()"));
        }
        if options.analyze {
            plugins.push(JsExpr::raw(
                "new BundleAnalyzerPlugin({ analyzerMode: 'static', openAnalyzer: false, \
                 reportFilename: path.resolve(__dirname, 'bundle-report.html') })",
            ));
        }

        Self {
            mode: options.mode,
            context: JsExpr::project_path("."),
            entry: format!("./{entry}"),
            output: Output {
                path: output_path,
                filename: if production { "[name].[contenthash].js" } else { "[name].js" },
                chunk_filename: if production {
                    "[name].[contenthash].chunk.js"
                } else {
                    "[name].chunk.js"
                },
                public_path: "/",
                clean: true,
            },
            resolve: Resolve {
                extensions: vec![".tsx", ".ts", ".jsx", ".js", ".json"],
                alias: BTreeMap::from([("@", JsExpr::project_path("src"))]),
            },
            module: ModuleRules {
                rules: rules(development, options.source_maps),
            },
            devtool: Toggle::when(options.source_maps, || {
                if development { "eval-source-map" } else { "source-map" }
            }),
            optimization: Optimization {
                minimize: production && options.minify,
                split_chunks: Toggle::when(production, vendor_chunks),
            },
            performance: Performance {
                hints: Toggle::when(production, || "warning"),
                max_entrypoint_size: PERFORMANCE_BUDGET,
                max_asset_size: PERFORMANCE_BUDGET,
            },
            stats: Stats {
                colors: development,
                modules: false,
                children: false,
                chunks: false,
                chunk_modules: false,
            },
            dev_server: development.then(|| dev_server(options)),
            plugins,
            analyze: options.analyze,
        }
    }

    /// Render as a CommonJS module.
    pub fn to_js(&self) -> String {
        let mut out = String::from(
            "// Generated by defai-element on every dev and build run. Do not edit.\n\
             'use strict';\n\n\
             const path = require('path');\n\
             const webpack = require('webpack');\n\
             const HtmlWebpackPlugin = require('html-webpack-plugin');\n",
        );
        if self.analyze {
            out.push_str("const { BundleAnalyzerPlugin } = require('webpack-bundle-analyzer');\n");
        }
        out.push_str("\nmodule.exports = ");
        // Serializing these plain structs cannot fail.
        let value = serde_json::to_value(self).unwrap_or(Value::Null);
        emit(&mut out, &value, Some(0));
        out.push_str(";\n");
        out
    }

    /// Write the module to `<project>/.defai/webpack.config.js`.
    #[instrument(skip_all, fields(mode = %self.mode))]
    pub fn write(&self, options: &BundlerOptions) -> Result<PathBuf, BundlerError> {
        let path = options.config_path();
        let write_err = |source| BundlerError::ConfigWrite {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(options.config_dir()).map_err(write_err)?;
        fs::write(&path, self.to_js()).map_err(write_err)?;
        debug!(path = %path.display(), "webpack config written");
        Ok(path)
    }
}

fn rules(development: bool, source_maps: bool) -> Vec<Rule> {
    let node_modules = || Some(JsExpr::regex("node_modules"));
    vec![
        Rule {
            test: JsExpr::regex(r"\.(ts|tsx|js|jsx)$"),
            exclude: node_modules(),
            loaders: vec![Loader {
                loader: "ts-loader",
                options: Some(json!({
                    "transpileOnly": development,
                    "configFile": JsExpr::project_path("tsconfig.json"),
                })),
            }],
            kind: None,
            parser: None,
        },
        Rule {
            test: JsExpr::regex(r"\.css$"),
            exclude: None,
            loaders: vec![
                Loader {
                    loader: "style-loader",
                    options: None,
                },
                Loader {
                    loader: "css-loader",
                    options: Some(json!({
                        "sourceMap": source_maps,
                        "modules": {
                            "auto": true,
                            "localIdentName": if development { "[name]__[local]" } else { "[hash:base64:8]" },
                        },
                    })),
                },
            ],
            kind: None,
            parser: None,
        },
        Rule {
            test: JsExpr::regex(r"\.(png|jpe?g|gif|svg|ico)$"),
            exclude: None,
            loaders: Vec::new(),
            kind: Some("asset"),
            parser: Some(json!({"dataUrlCondition": {"maxSize": INLINE_ASSET_LIMIT}})),
        },
        Rule {
            test: JsExpr::regex(r"\.(woff|woff2|eot|ttf|otf)$"),
            exclude: None,
            loaders: Vec::new(),
            kind: Some("asset/resource"),
            parser: None,
        },
    ]
}

fn vendor_chunks() -> SplitChunks {
    SplitChunks {
        chunks: "all",
        cache_groups: BTreeMap::from([(
            "vendor",
            CacheGroup {
                test: JsExpr::regex(r"[\\/]node_modules[\\/]"),
                name: "vendors",
                chunks: "all",
            },
        )]),
    }
}

fn dev_server(options: &BundlerOptions) -> DevServer {
    DevServer {
        host: options.host.clone(),
        port: options.port,
        hot: options.hot,
        compress: true,
        history_api_fallback: true,
        open: false,
        static_dir: StaticDir {
            directory: JsExpr::project_path("public"),
            public_path: "/",
        },
        headers: BTreeMap::from([
            ("Access-Control-Allow-Origin", "*"),
            (
                "Access-Control-Allow-Methods",
                "GET, POST, PUT, DELETE, PATCH, OPTIONS",
            ),
            (
                "Access-Control-Allow-Headers",
                "X-Requested-With, content-type, Authorization",
            ),
        ]),
        proxy: options
            .preview_port
            .map(|port| Proxy {
                context: PROXIED_ROUTES.to_vec(),
                target: format!("http://127.0.0.1:{port}"),
            })
            .into_iter()
            .collect(),
    }
}

fn html_plugin(production: bool) -> JsExpr {
    let minify = if production {
        json!({
            "removeComments": true,
            "collapseWhitespace": true,
            "removeRedundantAttributes": true,
            "useShortDoctype": true,
            "removeEmptyAttributes": true,
            "removeStyleLinkTypeAttributes": true,
            "keepClosingSlash": true,
            "minifyJS": true,
            "minifyCSS": true,
            "minifyURLs": true,
        })
    } else {
        Value::Bool(false)
    };
    let args = json!({
        "template": JsExpr::project_path("public/index.html"),
        "filename": "index.html",
        "inject": true,
        "minify": minify,
    });
    JsExpr(format!("new HtmlWebpackPlugin({})", compact(&args)))
}

fn define_plugin(mode: Mode) -> JsExpr {
    let args = json!({
        "process.env.NODE_ENV": js_string(mode.as_str()),
        "process.env.DEFAI_ELEMENT": "true",
    });
    JsExpr(format!("new webpack.DefinePlugin({})", compact(&args)))
}

// ============================================================================
// Emitter
// ============================================================================

fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

fn compact(value: &Value) -> String {
    let mut out = String::new();
    emit(&mut out, value, None);
    out
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// JSON-like output where marked strings become raw expressions and
/// identifier keys are left unquoted. `indent` of `None` means one line.
fn emit(out: &mut String, value: &Value, indent: Option<usize>) {
    let pad = |out: &mut String, level: usize| out.push_str(&"  ".repeat(level));
    match value {
        Value::String(s) => match s.strip_prefix(EXPR_MARK) {
            Some(expr) => out.push_str(expr),
            None => out.push_str(&js_string(s)),
        },
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                match indent {
                    Some(level) => {
                        out.push('\n');
                        pad(out, level + 1);
                        emit(out, item, Some(level + 1));
                    }
                    None => {
                        if i > 0 {
                            out.push(' ');
                        }
                        emit(out, item, None);
                    }
                }
            }
            if let Some(level) = indent {
                out.push('\n');
                pad(out, level);
            }
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                match indent {
                    Some(level) => {
                        out.push('\n');
                        pad(out, level + 1);
                    }
                    None => out.push(' '),
                }
                if is_identifier(key) {
                    out.push_str(key);
                } else {
                    out.push_str(&js_string(key));
                }
                out.push_str(": ");
                emit(out, item, indent.map(|level| level + 1));
            }
            match indent {
                Some(level) => {
                    out.push('\n');
                    pad(out, level);
                }
                None => out.push(' '),
            }
            out.push('}');
        }
        other => out.push_str(&other.to_string()),
    }
}
