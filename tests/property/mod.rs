mod document_properties;
mod span_properties;
