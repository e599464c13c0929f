/// ProgressReporter port for reporting progress of an import job
///
/// This is the caller's progress sink (a job queue, a console bar, ...).
/// It is separate from logging: messages here are meant for the person
/// waiting on the import.
pub trait ProgressReporter: Send + Sync {
    /// Reports overall progress
    ///
    /// # Arguments
    /// * `percent` - Overall progress, 0-100
    /// * `message` - Short description of what is happening
    fn report_progress(&self, percent: u8, message: &str);

    /// Reports an error or warning message
    fn report_error(&self, message: &str);

    /// Reports completion of the import
    fn report_completion(&self, message: &str);
}
