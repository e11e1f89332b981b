mod pipeline_tests;
mod render_tests;
