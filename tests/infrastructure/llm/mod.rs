mod fake_vendor;
