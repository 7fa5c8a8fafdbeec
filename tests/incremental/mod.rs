mod tests_reparse;
