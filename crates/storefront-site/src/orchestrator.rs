//! Storefront generation pipeline.
//!
//! One structured extraction produces the site record; every artifact after
//! that is a free-text model call whose code block is written to disk. A
//! failed artifact is recorded and the run moves on.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use storefront_llm::{
    ExtractionError, ExtractionRequest, ExtractorConfig, ImagePart, ModelGateway,
    StructuredExtractor, TransportError,
};
use storefront_schema::{extract_code, site_schema, Language, Record, SiteData};

use crate::assets::prepare_stylesheet;
use crate::progress::{ProgressReporter, TracingProgress};
use crate::prompts::{
    bindings, Bindings, PromptRegistry, TemplateError, COMPONENT_GENERATION, CSS_GENERATION,
    DATA_EXTRACTION, LAYOUT_GENERATION, PAGE_GENERATION,
};
use crate::writer::{FileWriter, FsWriter, WriteError};

/// Where the validated site record is written, relative to the output directory.
pub const SITE_DATA_PATH: &str = "src/data/products.json";

const COMPONENTS: [&str; 4] = ["Navbar", "Footer", "ProductCard", "ContactForm"];
const PAGES: [&str; 5] = ["homepage", "products", "about", "gallery", "contact"];

/// What to do when the site record cannot be extracted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Stop and return the extraction error
    #[default]
    Abort,

    /// Continue with [`SiteData::placeholder`]
    UsePlaceholder,
}

/// Configuration for a generation run.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Root of the generated project
    pub output_dir: PathBuf,

    /// Minify the generated stylesheet
    pub minify_css: bool,

    /// Extraction failure handling
    pub fallback: FallbackPolicy,

    /// Business name used for placeholder data
    pub placeholder_name: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("generated-site"),
            minify_css: false,
            fallback: FallbackPolicy::Abort,
            placeholder_name: String::new(),
        }
    }
}

/// One code-generation step.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationTask {
    /// Artifact name used in progress and failure reports
    pub name: String,

    /// Prompt template to render
    pub template: &'static str,

    /// Template inputs
    pub bindings: Bindings,

    /// Output path relative to the output directory
    pub path: PathBuf,

    /// Expected language of the generated code
    pub language: Language,
}

/// Why an artifact was not produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArtifactError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// A failed artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactFailure {
    pub artifact: String,
    pub path: PathBuf,
    pub error: ArtifactError,
}

/// Errors that stop a run.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Site data extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Generation cancelled before site data was extracted")]
    Cancelled,
}

/// Outcome of a run.
#[derive(Debug)]
pub struct GenerationReport {
    /// Root of the generated project
    pub output_dir: PathBuf,

    /// Site record every artifact was generated from
    pub site: Record,

    /// Files written with extracted code
    pub written: Vec<PathBuf>,

    /// Raw responses saved because no code could be extracted
    pub raw_outputs: Vec<PathBuf>,

    /// Artifacts that could not be produced
    pub failures: Vec<ArtifactFailure>,

    /// Whether placeholder data replaced a failed extraction
    pub used_placeholder: bool,

    /// Whether the run stopped early
    pub cancelled: bool,

    /// Total run time in milliseconds
    pub duration_ms: u64,
}

impl GenerationReport {
    /// Every artifact was produced and the run finished.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

enum Produced {
    Code(PathBuf),
    Raw(PathBuf),
}

impl ArtifactFailure {
    fn new(task: &GenerationTask, path: PathBuf, error: impl Into<ArtifactError>) -> Self {
        Self {
            artifact: task.name.clone(),
            path,
            error: error.into(),
        }
    }
}

/// Generates a storefront project from a business description.
pub struct Orchestrator {
    gateway: Arc<dyn ModelGateway>,
    extractor: StructuredExtractor,
    prompts: PromptRegistry,
    writer: Arc<dyn FileWriter>,
    progress: Arc<dyn ProgressReporter>,
    cancel: Arc<AtomicBool>,
    images: Vec<ImagePart>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create an orchestrator that writes to disk and logs progress.
    pub fn new(gateway: Arc<dyn ModelGateway>, config: OrchestratorConfig) -> Self {
        Self {
            extractor: StructuredExtractor::new(gateway.clone()),
            gateway,
            prompts: PromptRegistry::new(),
            writer: Arc::new(FsWriter),
            progress: Arc::new(TracingProgress),
            cancel: Arc::new(AtomicBool::new(false)),
            images: Vec::new(),
            config,
        }
    }

    /// Product photos sent with the site data extraction.
    pub fn with_images(mut self, images: Vec<ImagePart>) -> Self {
        self.images = images;
        self
    }

    pub fn with_writer(mut self, writer: Arc<dyn FileWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_extractor_config(mut self, config: ExtractorConfig) -> Self {
        self.extractor = StructuredExtractor::with_config(self.gateway.clone(), config);
        self
    }

    /// Share an externally owned cancellation flag.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Flag that stops the run between artifacts once set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Extract the validated site record for `description`.
    pub async fn extract_site(&self, description: &str) -> Result<Record, GenerationError> {
        let mut prompt = self
            .prompts
            .render(DATA_EXTRACTION, &bindings([("description", description)]))?;

        if !self.images.is_empty() {
            prompt.push_str(&format!(
                "\n{} product photo(s) are attached. Use them to describe the products, \
                 the gallery and the color palette.\n",
                self.images.len()
            ));
        }

        let mut request =
            ExtractionRequest::new(prompt, site_schema()).with_images(self.images.clone());
        if let Some(template) = self.prompts.get(DATA_EXTRACTION) {
            request = request.with_system_instruction(template.system_prompt);
        }

        Ok(self.extractor.extract(&request).await?)
    }

    /// Run the full pipeline.
    pub async fn run(&self, description: &str) -> Result<GenerationReport, GenerationError> {
        let start = Instant::now();

        if self.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        let (site, used_placeholder) = match self.extract_site(description).await {
            Ok(site) => (site, false),
            Err(GenerationError::Extraction(e))
                if self.config.fallback == FallbackPolicy::UsePlaceholder =>
            {
                tracing::warn!("Site data extraction failed, using placeholder data: {}", e);
                let placeholder = SiteData::placeholder(&self.config.placeholder_name)
                    .to_record()
                    .map_err(|e| GenerationError::Extraction(e.into()))?;
                (placeholder, true)
            }
            Err(e) => return Err(e),
        };

        let tasks = artifact_tasks(&site, &self.prompts);
        let total = tasks.len() + 1;

        let mut report = GenerationReport {
            output_dir: self.config.output_dir.clone(),
            site,
            written: Vec::new(),
            raw_outputs: Vec::new(),
            failures: Vec::new(),
            used_placeholder,
            cancelled: false,
            duration_ms: 0,
        };

        let data_path = self.config.output_dir.join(SITE_DATA_PATH);
        match self.writer.write(&data_path, &report.site.to_json_pretty()) {
            Ok(()) => report.written.push(data_path),
            Err(e) => {
                tracing::error!("{}", e);
                report.failures.push(ArtifactFailure {
                    artifact: "site data".to_string(),
                    path: data_path,
                    error: e.into(),
                });
            }
        }
        self.progress.report("site data", 1.0 / total as f32);

        for (index, task) in tasks.iter().enumerate() {
            if self.is_cancelled() {
                tracing::warn!("Generation cancelled before {}", task.name);
                report.cancelled = true;
                break;
            }

            tracing::info!("Generating {}", task.name);
            match self.generate(task).await? {
                Ok(Produced::Code(path)) => report.written.push(path),
                Ok(Produced::Raw(path)) => {
                    tracing::warn!(
                        "No code found for {}, raw response saved to {}",
                        task.name,
                        path.display()
                    );
                    report.raw_outputs.push(path);
                }
                Err(failure) => {
                    tracing::error!("Failed to generate {}: {}", task.name, failure.error);
                    report.failures.push(failure);
                }
            }

            self.progress
                .report(&task.name, (index + 2) as f32 / total as f32);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Produce one artifact. The outer error aborts the run, the inner one
    /// is recorded against the artifact.
    async fn generate(
        &self,
        task: &GenerationTask,
    ) -> Result<Result<Produced, ArtifactFailure>, GenerationError> {
        let prompt = self.prompts.render(task.template, &task.bindings)?;
        let system = self.prompts.get(task.template).map(|t| t.system_prompt);
        let path = self.config.output_dir.join(&task.path);

        let response = match self.gateway.invoke(&prompt, system).await {
            Ok(response) => response,
            Err(e) => return Ok(Err(ArtifactFailure::new(task, path, e))),
        };

        tracing::debug!(
            "Extracting {} code for {}",
            task.language.as_str(),
            task.name
        );
        let code = extract_code(&response, task.language);

        let (target, contents, produced): (PathBuf, String, fn(PathBuf) -> Produced) =
            if code.is_empty() {
                (raw_output_path(&path), response, Produced::Raw)
            } else if task.language == Language::Css {
                let css = prepare_stylesheet(&code, self.config.minify_css);
                (path, css, Produced::Code)
            } else {
                (path, code, Produced::Code)
            };

        Ok(match self.writer.write(&target, &contents) {
            Ok(()) => Ok(produced(target)),
            Err(e) => Err(ArtifactFailure::new(task, target, e)),
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

/// The fixed, ordered list of artifacts generated from `site`.
///
/// Each task expects the output language its template declares in `prompts`.
pub fn artifact_tasks(site: &Record, prompts: &PromptRegistry) -> Vec<GenerationTask> {
    let language = |template: &str| {
        prompts
            .get(template)
            .map(|t| t.language)
            .unwrap_or_default()
    };
    let site_data = site.to_json_pretty();
    let design_system = site
        .get("designSystem")
        .and_then(|value| serde_json::to_string_pretty(value).ok())
        .unwrap_or_default();

    let components = COMPONENTS.iter().map(|name| GenerationTask {
        name: name.to_string(),
        template: COMPONENT_GENERATION,
        bindings: bindings([("component_name", *name), ("site_data", site_data.as_str())]),
        path: PathBuf::from(format!("src/components/{}.tsx", name)),
        language: language(COMPONENT_GENERATION),
    });

    let pages = PAGES.iter().map(|name| GenerationTask {
        name: format!("{} page", name),
        template: PAGE_GENERATION,
        bindings: bindings([("page_name", *name), ("site_data", site_data.as_str())]),
        path: page_path(name),
        language: language(PAGE_GENERATION),
    });

    let layout = GenerationTask {
        name: "RootLayout".to_string(),
        template: LAYOUT_GENERATION,
        bindings: bindings([("site_data", site_data.as_str())]),
        path: PathBuf::from("src/app/layout.tsx"),
        language: language(LAYOUT_GENERATION),
    };

    let stylesheet = GenerationTask {
        name: "GlobalsCSS".to_string(),
        template: CSS_GENERATION,
        bindings: bindings([("design_system", design_system)]),
        path: PathBuf::from("src/app/globals.css"),
        language: language(CSS_GENERATION),
    };

    components
        .chain(pages)
        .chain([layout, stylesheet])
        .collect()
}

fn page_path(name: &str) -> PathBuf {
    if name == "homepage" {
        PathBuf::from("src/app/page.tsx")
    } else {
        PathBuf::from(format!("src/app/{}/page.tsx", name))
    }
}

fn raw_output_path(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(".raw.txt");
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::PromptTemplate;
    use crate::writer::DryRunWriter;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tempfile::TempDir;

    type Responder = dyn Fn(&str) -> Result<String, TransportError> + Send + Sync;

    /// Answers extraction prompts with valid site JSON and everything else
    /// with `respond`.
    struct StubGateway {
        respond: Box<Responder>,
        calls: AtomicUsize,
    }

    impl StubGateway {
        fn new(
            respond: impl Fn(&str) -> Result<String, TransportError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                respond: Box::new(respond),
                calls: AtomicUsize::new(0),
            })
        }

        fn tsx() -> Arc<Self> {
            Self::new(|prompt| {
                if prompt.contains("Design system:") {
                    Ok("```css\n:root {\n  --color-primary: #8B5E3C;\n}\n```".to_string())
                } else {
                    Ok("Here you go:\n```tsx\nexport default function Generated() {}\n```"
                        .to_string())
                }
            })
        }
    }

    fn site_json() -> String {
        serde_json::to_string(&SiteData::placeholder("Clay Corner")).unwrap()
    }

    #[async_trait]
    impl ModelGateway for StubGateway {
        async fn invoke(
            &self,
            prompt: &str,
            _system_instruction: Option<&str>,
        ) -> Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if prompt.contains("described their business") {
                return Ok(site_json());
            }
            (self.respond)(prompt)
        }
    }

    fn config(dir: &TempDir) -> OrchestratorConfig {
        OrchestratorConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        updates: Mutex<Vec<(String, f32)>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn report(&self, step: &str, fraction: f32) {
            self.updates.lock().unwrap().push((step.to_string(), fraction));
        }
    }

    #[test]
    fn lists_artifacts_in_order() {
        let site = SiteData::placeholder("Clay Corner").to_record().unwrap();

        let tasks = artifact_tasks(&site, &PromptRegistry::new());
        let paths: Vec<_> = tasks.iter().map(|t| t.path.to_str().unwrap()).collect();

        assert_eq!(
            paths,
            vec![
                "src/components/Navbar.tsx",
                "src/components/Footer.tsx",
                "src/components/ProductCard.tsx",
                "src/components/ContactForm.tsx",
                "src/app/page.tsx",
                "src/app/products/page.tsx",
                "src/app/about/page.tsx",
                "src/app/gallery/page.tsx",
                "src/app/contact/page.tsx",
                "src/app/layout.tsx",
                "src/app/globals.css",
            ]
        );
        assert!(tasks[10].bindings["design_system"].contains("colorPalette"));
        assert!(!tasks[10].bindings["design_system"].contains("artisanInfo"));
        assert_eq!(tasks[0].bindings["component_name"], "Navbar");
        assert_eq!(tasks[0].language, Language::Tsx);
        assert_eq!(tasks[10].language, Language::Css);
    }

    #[test]
    fn task_languages_follow_the_registry() {
        let site = SiteData::placeholder("Clay Corner").to_record().unwrap();
        let mut prompts = PromptRegistry::new();
        let css = prompts.get(CSS_GENERATION).unwrap().clone();
        prompts
            .register(PromptTemplate {
                language: Language::Unknown,
                ..css
            })
            .unwrap();

        let tasks = artifact_tasks(&site, &prompts);

        assert_eq!(tasks[10].language, Language::Unknown);
        assert_eq!(tasks[9].language, Language::Tsx);
    }

    #[tokio::test]
    async fn generates_every_artifact() {
        let dir = TempDir::new().unwrap();
        let gateway = StubGateway::tsx();
        let progress = Arc::new(RecordingProgress::default());
        let orchestrator =
            Orchestrator::new(gateway.clone(), config(&dir)).with_progress(progress.clone());

        let report = orchestrator.run("I make pottery").await.unwrap();

        assert!(report.is_complete());
        assert!(!report.used_placeholder);
        assert_eq!(report.written.len(), 12);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 12);
        assert_eq!(
            report.site.get("artisanInfo.name").unwrap(),
            &serde_json::json!("Clay Corner")
        );

        let data: SiteData = serde_json::from_str(
            &fs::read_to_string(dir.path().join(SITE_DATA_PATH)).unwrap(),
        )
        .unwrap();
        assert_eq!(data, SiteData::placeholder("Clay Corner"));
        assert_eq!(
            fs::read_to_string(dir.path().join("src/app/about/page.tsx")).unwrap(),
            "export default function Generated() {}"
        );

        let updates = progress.updates.lock().unwrap();
        assert_eq!(updates.len(), 12);
        assert_eq!(updates[0].0, "site data");
        assert_eq!(updates[11], ("GlobalsCSS".to_string(), 1.0));
        assert!(updates.windows(2).all(|w| w[0].1 < w[1].1));
    }

    #[tokio::test]
    async fn continues_past_failed_artifacts() {
        let dir = TempDir::new().unwrap();
        let gateway = StubGateway::new(|prompt| {
            if prompt.contains("Component: Footer") {
                Err(TransportError::Exhausted {
                    attempts: 2,
                    last: Box::new(TransportError::Status {
                        status: 503,
                        body: String::new(),
                    }),
                })
            } else {
                Ok("```tsx\nexport default function Generated() {}\n```".to_string())
            }
        });

        let report = Orchestrator::new(gateway, config(&dir))
            .run("I make pottery")
            .await
            .unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].artifact, "Footer");
        assert!(matches!(
            report.failures[0].error,
            ArtifactError::Transport(TransportError::Exhausted { .. })
        ));
        assert_eq!(report.written.len(), 11);
        assert!(!dir.path().join("src/components/Footer.tsx").exists());
        assert!(dir.path().join("src/components/ProductCard.tsx").exists());
    }

    /// Writes to disk except for paths ending in one of `refuse`.
    struct RefusingWriter {
        refuse: Vec<&'static str>,
    }

    impl FileWriter for RefusingWriter {
        fn write(&self, path: &Path, contents: &str) -> Result<(), WriteError> {
            if self.refuse.iter().any(|suffix| path.ends_with(suffix)) {
                return Err(WriteError {
                    path: path.display().to_string(),
                    message: "disk full".to_string(),
                });
            }
            FsWriter.write(path, contents)
        }
    }

    #[tokio::test]
    async fn write_failures_are_recorded_and_the_run_continues() {
        let dir = TempDir::new().unwrap();
        let writer = Arc::new(RefusingWriter {
            refuse: vec![SITE_DATA_PATH, "src/components/Navbar.tsx"],
        });

        let report = Orchestrator::new(StubGateway::tsx(), config(&dir))
            .with_writer(writer)
            .run("I make pottery")
            .await
            .unwrap();

        assert!(!report.cancelled);
        assert_eq!(report.written.len(), 10);
        assert_eq!(
            report
                .failures
                .iter()
                .map(|f| (f.artifact.as_str(), f.path.clone()))
                .collect::<Vec<_>>(),
            vec![
                ("site data", dir.path().join(SITE_DATA_PATH)),
                ("Navbar", dir.path().join("src/components/Navbar.tsx")),
            ]
        );
        assert!(report
            .failures
            .iter()
            .all(|f| matches!(f.error, ArtifactError::Write(_))));
        assert!(dir.path().join("src/app/globals.css").exists());
    }

    #[tokio::test]
    async fn failed_raw_output_reports_the_raw_path() {
        let dir = TempDir::new().unwrap();
        let gateway = StubGateway::new(|prompt| {
            if prompt.contains("Component: Footer") {
                Ok("```tsx\n```".to_string())
            } else {
                Ok("```tsx\nexport default function Generated() {}\n```".to_string())
            }
        });
        let writer = Arc::new(RefusingWriter {
            refuse: vec!["src/components/Footer.tsx.raw.txt"],
        });

        let report = Orchestrator::new(gateway, config(&dir))
            .with_writer(writer)
            .run("I make pottery")
            .await
            .unwrap();

        assert_eq!(report.failures.len(), 1);
        let failure = &report.failures[0];
        assert_eq!(
            failure.path,
            dir.path().join("src/components/Footer.tsx.raw.txt")
        );
        match &failure.error {
            ArtifactError::Write(e) => assert_eq!(e.path, failure.path.display().to_string()),
            other => panic!("expected a write failure, got {:?}", other),
        }
        assert!(report.raw_outputs.is_empty());
    }

    /// Answers with site JSON only when photos are attached.
    struct PhotoAwareGateway {
        image_counts: Mutex<Vec<usize>>,
        extraction_prompt: Mutex<String>,
    }

    #[async_trait]
    impl ModelGateway for PhotoAwareGateway {
        async fn invoke(
            &self,
            prompt: &str,
            system_instruction: Option<&str>,
        ) -> Result<String, TransportError> {
            self.invoke_with_images(prompt, system_instruction, &[]).await
        }

        async fn invoke_with_images(
            &self,
            prompt: &str,
            _system_instruction: Option<&str>,
            images: &[ImagePart],
        ) -> Result<String, TransportError> {
            self.image_counts.lock().unwrap().push(images.len());
            if prompt.contains("described their business") {
                *self.extraction_prompt.lock().unwrap() = prompt.to_string();
                return Ok(site_json());
            }
            Ok("```tsx\nexport default function Generated() {}\n```".to_string())
        }
    }

    #[tokio::test]
    async fn photos_go_with_site_data_extraction_only() {
        let dir = TempDir::new().unwrap();
        let gateway = Arc::new(PhotoAwareGateway {
            image_counts: Mutex::new(Vec::new()),
            extraction_prompt: Mutex::new(String::new()),
        });
        let photos = vec![ImagePart::new("image/png", vec![1, 2, 3])];

        let report = Orchestrator::new(gateway.clone(), config(&dir))
            .with_images(photos)
            .run("I make pottery")
            .await
            .unwrap();

        assert!(report.is_complete());
        let counts = gateway.image_counts.lock().unwrap();
        assert_eq!(counts[0], 1);
        assert!(counts[1..].iter().all(|n| *n == 0));
        assert!(gateway
            .extraction_prompt
            .lock()
            .unwrap()
            .contains("1 product photo(s) are attached"));
    }

    #[tokio::test]
    async fn saves_raw_response_when_no_code_found() {
        let dir = TempDir::new().unwrap();
        let gateway = StubGateway::new(|prompt| {
            if prompt.contains("Component: Navbar") {
                Ok("```tsx\n```".to_string())
            } else {
                Ok("```tsx\nexport default function Generated() {}\n```".to_string())
            }
        });

        let report = Orchestrator::new(gateway, config(&dir))
            .run("I make pottery")
            .await
            .unwrap();

        let raw = dir.path().join("src/components/Navbar.tsx.raw.txt");
        assert_eq!(report.raw_outputs, vec![raw.clone()]);
        assert_eq!(fs::read_to_string(raw).unwrap(), "```tsx\n```");
        assert!(!dir.path().join("src/components/Navbar.tsx").exists());
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn minifies_stylesheet_when_asked() {
        let dir = TempDir::new().unwrap();
        let config = OrchestratorConfig {
            minify_css: true,
            ..config(&dir)
        };

        Orchestrator::new(StubGateway::tsx(), config)
            .run("I make pottery")
            .await
            .unwrap();

        let css = fs::read_to_string(dir.path().join("src/app/globals.css")).unwrap();
        assert!(!css.contains('\n'));
        assert!(css.contains("--color-primary"));
    }

    #[tokio::test]
    async fn aborts_when_extraction_fails_by_default() {
        let dir = TempDir::new().unwrap();
        let gateway = Arc::new(FailingExtraction);

        let err = Orchestrator::new(gateway, config(&dir))
            .run("I make pottery")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GenerationError::Extraction(ExtractionError::Parse { .. })
        ));
        assert!(!dir.path().join(SITE_DATA_PATH).exists());
    }

    #[tokio::test]
    async fn placeholder_policy_substitutes_default_site() {
        let dir = TempDir::new().unwrap();
        let config = OrchestratorConfig {
            fallback: FallbackPolicy::UsePlaceholder,
            placeholder_name: "Wool & Whimsy".to_string(),
            ..config(&dir)
        };

        let report = Orchestrator::new(Arc::new(FailingExtraction), config)
            .run("I knit")
            .await
            .unwrap();

        assert!(report.used_placeholder);
        assert_eq!(
            report.site.get("artisanInfo.name").unwrap(),
            &serde_json::json!("Wool & Whimsy")
        );
        assert!(dir.path().join(SITE_DATA_PATH).exists());
    }

    /// Never returns JSON.
    struct FailingExtraction;

    #[async_trait]
    impl ModelGateway for FailingExtraction {
        async fn invoke(
            &self,
            _prompt: &str,
            _system_instruction: Option<&str>,
        ) -> Result<String, TransportError> {
            Ok("Sorry, I can only answer in prose today.".to_string())
        }
    }

    #[tokio::test]
    async fn stops_between_artifacts_when_cancelled() {
        let dir = TempDir::new().unwrap();
        let orchestrator = Orchestrator::new(StubGateway::tsx(), config(&dir));
        let cancel = orchestrator.cancel_flag();
        let orchestrator = orchestrator.with_progress(Arc::new(move |step: &str, _: f32| {
            if step == "Navbar" {
                cancel.store(true, Ordering::SeqCst);
            }
        }));

        let report = orchestrator.run("I make pottery").await.unwrap();

        assert!(report.cancelled);
        assert!(!report.is_complete());
        assert_eq!(report.written.len(), 2);
        assert!(!dir.path().join("src/components/Footer.tsx").exists());
    }

    #[tokio::test]
    async fn cancelled_before_start_does_nothing() {
        let dir = TempDir::new().unwrap();
        let gateway = StubGateway::tsx();
        let cancel = Arc::new(AtomicBool::new(true));

        let err = Orchestrator::new(gateway.clone(), config(&dir))
            .with_cancel_flag(cancel)
            .run("I make pottery")
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Cancelled));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let writer = Arc::new(DryRunWriter::new());

        let report = Orchestrator::new(StubGateway::tsx(), config(&dir))
            .with_writer(writer.clone())
            .run("I make pottery")
            .await
            .unwrap();

        assert_eq!(report.written.len(), 12);
        assert_eq!(writer.seen().len(), 12);
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn missing_binding_aborts() {
        let dir = TempDir::new().unwrap();
        let orchestrator = Orchestrator::new(StubGateway::tsx(), config(&dir));
        let task = GenerationTask {
            name: "Navbar".to_string(),
            template: COMPONENT_GENERATION,
            bindings: bindings([("site_data", "{}")]),
            path: PathBuf::from("src/components/Navbar.tsx"),
            language: Language::Tsx,
        };

        let err = orchestrator.generate(&task).await.err().unwrap();

        assert!(matches!(
            err,
            GenerationError::Template(TemplateError::MissingBinding { ref binding, .. })
                if binding == "component_name"
        ));
    }
}
