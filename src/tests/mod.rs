mod support;

mod unit_library_view;
mod unit_models_pages;
mod unit_upload_validation;
