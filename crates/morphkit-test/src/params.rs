//! Regression test parameters and operations

use morphkit_core::Image;

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Compare results with expectations (default)
    #[default]
    Compare,
    /// Display mode - also dump compared images to the log
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// This structure tracks the state of a regression test, including
/// the test name, current index, mode, and success status.
pub struct RegParams {
    /// Name of the test (e.g., "primitive")
    pub test_name: String,
    /// Current test index (incremented before each test)
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// # Arguments
    ///
    /// * `test_name` - Name of the test (e.g., "primitive")
    ///
    /// # Returns
    ///
    /// A new `RegParams` instance configured from the `REGTEST_MODE`
    /// environment variable. Also installs the test log subscriber.
    pub fn new(test_name: &str) -> Self {
        crate::init_tracing();
        let mode = RegTestMode::from_env();

        tracing::info!(test = test_name, ?mode, "starting {}_reg", test_name);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, msg: String) {
        tracing::error!("{}", msg);
        self.failures.push(msg);
        self.success = false;
    }

    /// Compare two floating-point values
    ///
    /// # Arguments
    ///
    /// * `expected` - Expected value
    /// * `actual` - Actual computed value
    /// * `delta` - Maximum allowed difference
    ///
    /// # Returns
    ///
    /// `true` if values match within delta, `false` otherwise.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta || diff.is_nan() {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.fail(msg);
            false
        } else {
            true
        }
    }

    /// Compare two images sample by sample
    ///
    /// # Arguments
    ///
    /// * `expected` - Expected image
    /// * `actual` - Actual image
    /// * `delta` - Maximum allowed per-sample difference
    ///
    /// # Returns
    ///
    /// `true` if the images have the same shape and every sample matches
    /// within delta.
    pub fn compare_images(&mut self, expected: &Image, actual: &Image, delta: f64) -> bool {
        self.index += 1;

        if self.display() {
            tracing::info!("index {} expected:\n{}", self.index, crate::dump(expected));
            tracing::info!("index {} actual:\n{}", self.index, crate::dump(actual));
        }

        if let Err(e) = expected.check_same_shape(actual) {
            let msg = format!(
                "Failure in {}_reg: image comparison for index {} - {}",
                self.test_name, self.index, e
            );
            self.fail(msg);
            return false;
        }

        let n = expected.channel_count();
        let width = expected.width() as usize;
        let mismatch = expected
            .data()
            .iter()
            .zip(actual.data())
            .position(|(a, b)| (a - b).abs() > delta || (a - b).is_nan());

        if let Some(i) = mismatch {
            let pixel = i / n;
            let msg = format!(
                "Failure in {}_reg: image comparison for index {} - sample mismatch at ({}, {}) channel {}: expected {}, actual {}",
                self.test_name,
                self.index,
                pixel % width,
                pixel / width,
                i % n,
                expected.data()[i],
                actual.data()[i]
            );
            self.fail(msg);
            return false;
        }

        true
    }

    /// Compare two strings for exact equality
    ///
    /// # Returns
    ///
    /// `true` if the strings are identical, `false` otherwise.
    pub fn compare_strings(&mut self, expected: &str, actual: &str) -> bool {
        self.index += 1;

        if expected != actual {
            let msg = format!(
                "Failure in {}_reg: string comparison for index {}\n\
                 expected:\n{}\nactual:\n{}",
                self.test_name, self.index, expected, actual
            );
            self.fail(msg);
            false
        } else {
            true
        }
    }

    /// Record a boolean check
    ///
    /// # Returns
    ///
    /// The value of `condition`.
    pub fn check(&mut self, condition: bool, what: &str) -> bool {
        self.index += 1;
        if !condition {
            let msg = format!(
                "Failure in {}_reg: check for index {} - {}",
                self.test_name, self.index, what
            );
            self.fail(msg);
        }
        condition
    }

    /// Clean up and report results
    ///
    /// # Returns
    ///
    /// `true` if all tests passed, `false` if any failed.
    pub fn cleanup(self) -> bool {
        if self.success {
            tracing::info!("SUCCESS: {}_reg", self.test_name);
        } else {
            tracing::error!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                tracing::error!("  {}", failure);
            }
        }

        self.success
    }

    /// Check if all tests have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
