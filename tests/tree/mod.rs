mod tests_navigation;
